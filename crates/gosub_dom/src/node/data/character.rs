/// Data of text and comment nodes
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CharacterData {
    pub value: String,
}

impl CharacterData {
    pub(crate) fn new(value: &str) -> Self {
        Self {
            value: value.to_owned(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Length as seen by scripts, in UTF-16 code units
    pub fn length(&self) -> usize {
        self.value.encode_utf16().count()
    }
}
