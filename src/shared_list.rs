use std::cell::{RefCell, RefMut};
use std::rc::Rc;

#[derive(Debug)]
pub struct SharedList<T> {
    head: Link<T>,
}

type Link<T> = Option<Rc<RefCell<Node<T>>>>;

#[derive(Debug)]
struct Node<T> {
    elem: T,
    next: Link<T>,
}

impl<T> Clone for SharedList<T> {
    fn clone(&self) -> SharedList<T> {
        SharedList {
            head: self.head.clone(),
        }
    }
}

impl<T> SharedList<T> {
    pub fn new() -> Self {
        SharedList { head: None }
    }

    pub fn with(&self, elem: T) -> SharedList<T> {
        SharedList {
            head: Some(Rc::new(RefCell::new(Node {
                elem,
                next: self.head.clone(),
            }))),
        }
    }

    pub fn peek_mut(&mut self) -> Option<RefMut<T>> {
        self.head
            .as_ref()
            .map(|node| RefMut::map(node.borrow_mut(), |node| &mut node.elem))
    }

    pub fn find_map<R>(&self, mut f: impl FnMut(&T) -> Option<R>) -> Option<R> {
        let mut link = self.head.clone();
        while let Some(node) = link {
            if let Some(found) = f(&node.borrow().elem) {
                return Some(found);
            }
            link = node.borrow().next.clone();
        }
        None
    }

    pub fn find_map_mut<R>(&self, mut f: impl FnMut(&mut T) -> Option<R>) -> Option<R> {
        let mut link = self.head.clone();
        while let Some(node) = link {
            if let Some(found) = f(&mut node.borrow_mut().elem) {
                return Some(found);
            }
            link = node.borrow().next.clone();
        }
        None
    }

    pub fn len(&self) -> usize {
        let mut len = 0;
        let mut link = self.head.clone();
        while let Some(node) = link {
            len += 1;
            link = node.borrow().next.clone();
        }
        len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl<T> Drop for SharedList<T> {
    // Unlink iteratively so a long chain can't overflow the stack. Stops at the
    // first node some other list still holds.
    fn drop(&mut self) {
        let mut link = self.head.take();
        while let Some(node) = link {
            link = match Rc::try_unwrap(node) {
                Ok(cell) => cell.into_inner().next,
                Err(_) => None,
            };
        }
    }
}
