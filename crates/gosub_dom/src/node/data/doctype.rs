/// Name and identifiers of a `<!DOCTYPE>`
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct DocTypeData {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

impl DocTypeData {
    #[must_use]
    pub fn new(name: &str, public_id: &str, system_id: &str) -> Self {
        Self {
            name: name.to_owned(),
            public_id: public_id.to_owned(),
            system_id: system_id.to_owned(),
        }
    }
}
