use crate::{Identified, LifecycleContext, RenderContext, RibbitObject, UpdateContext};
use ribbit_common::ObjectId;
use std::any::Any;

/// Type-erased access to a value's concrete type.
///
/// Blanket-implemented for every `'static` type, so components get it for
/// free.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of behaviour attached to a [`GameObject`](crate::GameObject).
///
/// Every hook has a no-op default; implement the ones you need. Within a
/// frame the owning object runs each phase across all of its components in
/// insertion order before starting the next phase.
pub trait Component: AsAny {
    fn object(&self) -> &RibbitObject;

    fn id(&self) -> ObjectId {
        self.object().id()
    }

    /// Short type name, used by the debug tools.
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    fn init(&mut self, _ctx: &mut LifecycleContext<'_>) {}

    fn destroy(&mut self, _ctx: &mut LifecycleContext<'_>) {}

    fn before_update(&mut self, _ctx: &mut UpdateContext<'_>) {}

    fn update(&mut self, _ctx: &mut UpdateContext<'_>) {}

    fn after_update(&mut self, _ctx: &mut UpdateContext<'_>) {}

    fn before_render(&mut self, _ctx: &mut RenderContext<'_>) {}

    fn render(&mut self, _ctx: &mut RenderContext<'_>) {}

    fn after_render(&mut self, _ctx: &mut RenderContext<'_>) {}
}

impl Identified for Box<dyn Component> {
    fn id(&self) -> ObjectId {
        (**self).id()
    }

    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        (**self).as_any_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Collection;

    struct Spin {
        object: RibbitObject,
        turns: u32,
    }

    impl Component for Spin {
        fn object(&self) -> &RibbitObject {
            &self.object
        }
    }

    struct Glow {
        object: RibbitObject,
    }

    impl Component for Glow {
        fn object(&self) -> &RibbitObject {
            &self.object
        }
    }

    #[test]
    fn name_is_the_short_type_name() {
        let spin = Spin {
            object: RibbitObject::new("Component"),
            turns: 0,
        };
        assert_eq!(spin.name(), "Spin");
        let boxed: Box<dyn Component> = Box::new(spin);
        assert_eq!(boxed.name(), "Spin");
    }

    #[test]
    fn boxed_components_downcast_to_their_concrete_type() {
        let mut c: Collection<Box<dyn Component>> = Collection::new();
        c.add(Box::new(Glow {
            object: RibbitObject::new("Component"),
        }))
        .unwrap();
        c.add(Box::new(Spin {
            object: RibbitObject::new("Component"),
            turns: 3,
        }))
        .unwrap();
        assert_eq!(c.first_of::<Spin>().map(|s| s.turns), Some(3));
        assert_eq!(c.count_of::<Glow>(), 1);
        assert!(!c.has_type::<Box<dyn Component>>());
        c.first_of_mut::<Spin>().unwrap().turns += 1;
        assert_eq!(c.first_of::<Spin>().unwrap().turns, 4);
    }
}
