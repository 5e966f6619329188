use std::cell::{BorrowError, BorrowMutError, Ref, RefCell, RefMut};
use std::fmt::Debug;
use std::rc::Rc;

/// Shared, single-threaded handle to a document. Every holder sees the same tree.
pub struct DocumentHandle<D>(pub Rc<RefCell<D>>);

impl<D> DocumentHandle<D> {
    /// Create a new DocumentHandle from a document
    pub fn create(document: D) -> Self {
        DocumentHandle(Rc::new(RefCell::new(document)))
    }

    /// Returns the document as referenced by the handle
    pub fn get(&self) -> Ref<'_, D> {
        self.0.borrow()
    }

    /// Returns the document mutably. Panics when the document is already borrowed, use
    /// [`DocumentHandle::try_get_mut`] on paths that can run while a borrow is held.
    pub fn get_mut(&self) -> RefMut<'_, D> {
        self.0.borrow_mut()
    }

    pub fn try_get(&self) -> Result<Ref<'_, D>, BorrowError> {
        self.0.try_borrow()
    }

    pub fn try_get_mut(&self) -> Result<RefMut<'_, D>, BorrowMutError> {
        self.0.try_borrow_mut()
    }

    /// Returns true when both handles point to the same document
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<D: Debug> Debug for DocumentHandle<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.try_borrow() {
            Ok(doc) => write!(f, "{:?}", doc),
            Err(_) => write!(f, "DocumentHandle(<borrowed>)"),
        }
    }
}

impl<D> PartialEq for DocumentHandle<D> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<D> Eq for DocumentHandle<D> {}

// NOTE: cloning a handle clones the reference, never the document.
impl<D> Clone for DocumentHandle<D> {
    fn clone(&self) -> DocumentHandle<D> {
        DocumentHandle(Rc::clone(&self.0))
    }
}
