//! Vertical scroll position shared along a chain of views
//!
//! Every view owns one [`ScrollLink`]. Links form a doubly linked list
//! through weak references; the list never owns a view, so dropping a view
//! only needs it to unlink itself.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

#[derive(Default)]
pub struct ScrollLink {
    yoff: Cell<i64>,
    yoff_max: Cell<i64>,
    prev: RefCell<Weak<ScrollLink>>,
    next: RefCell<Weak<ScrollLink>>,
}

impl ScrollLink {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn yoff(&self) -> i64 {
        self.yoff.get()
    }

    pub fn yoff_max(&self) -> i64 {
        self.yoff_max.get()
    }

    /// Set this link's position without touching its siblings
    pub fn set_local(&self, yoff: i64) {
        self.yoff.set(yoff.clamp(0, self.yoff_max.get()));
    }

    pub fn set_max(&self, yoff_max: i64) {
        self.yoff_max.set(yoff_max.max(0));
        self.set_local(self.yoff.get());
    }

    /// Push this link's position to every sibling on both sides
    ///
    /// Each sibling clamps the value to its own range; none of them
    /// propagates further, so the origin is never revisited.
    pub fn propagate(&self) {
        let yoff = self.yoff.get();

        let mut cursor = self.prev.borrow().upgrade();
        while let Some(link) = cursor {
            link.set_local(yoff);
            cursor = link.prev.borrow().upgrade();
        }

        let mut cursor = self.next.borrow().upgrade();
        while let Some(link) = cursor {
            link.set_local(yoff);
            cursor = link.next.borrow().upgrade();
        }
    }

    pub fn is_linked(&self) -> bool {
        self.prev.borrow().strong_count() > 0 || self.next.borrow().strong_count() > 0
    }

    /// Number of other links reachable from this one
    pub fn sibling_count(&self) -> usize {
        let mut count = 0;

        let mut cursor = self.prev.borrow().upgrade();
        while let Some(link) = cursor {
            count += 1;
            cursor = link.prev.borrow().upgrade();
        }

        let mut cursor = self.next.borrow().upgrade();
        while let Some(link) = cursor {
            count += 1;
            cursor = link.next.borrow().upgrade();
        }

        count
    }

    /// Move `this` into the chain directly after `other`
    pub fn insert_after(this: &Rc<ScrollLink>, other: &Rc<ScrollLink>) {
        if Rc::ptr_eq(this, other) {
            return;
        }
        Self::remove(this);

        let after = other.next.replace(Rc::downgrade(this));
        if let Some(after) = after.upgrade() {
            *after.prev.borrow_mut() = Rc::downgrade(this);
        }

        *this.prev.borrow_mut() = Rc::downgrade(other);
        *this.next.borrow_mut() = after;
    }

    /// Take this link out of its chain, joining its neighbours together
    pub fn remove(&self) {
        let prev = self.prev.replace(Weak::new());
        let next = self.next.replace(Weak::new());

        if let Some(p) = prev.upgrade() {
            *p.next.borrow_mut() = next.clone();
        }
        if let Some(n) = next.upgrade() {
            *n.prev.borrow_mut() = prev;
        }
    }
}
