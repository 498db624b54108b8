//! Index newtypes that back the Stream/Representation/AdaptationSet arenas
//! (SPEC_FULL.md §3.1 "Arena layout"). Owning edges are `Vec<Idx>`; back-edges
//! (Stream -> owning Representation/AdaptationSet) are a bare `Idx` resolved
//! through the arena, which avoids the Stream/Representation/AdaptationSet
//! reference cycle an `Rc<RefCell<_>>` graph would otherwise require.

macro_rules! define_index {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                $name(value as u32)
            }
        }
    };
}

define_index!(StreamIdx);
define_index!(RepIdx);
define_index!(AsIdx);
define_index!(PeriodIdx);
