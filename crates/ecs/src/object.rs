use ribbit_common::ObjectId;

/// Identity shared by every engine entity: a namespaced id plus a logging
/// span carrying `kind` and `id` fields.
#[derive(Debug, Clone)]
pub struct RibbitObject {
    id: ObjectId,
    span: tracing::Span,
}

impl RibbitObject {
    /// Allocate the next id in the `kind` namespace.
    pub fn new(kind: &'static str) -> Self {
        Self::with_id(ObjectId::next(kind))
    }

    pub fn with_id(id: ObjectId) -> Self {
        let span = tracing::debug_span!("object", kind = id.namespace(), id = %id);
        Self { id, span }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> &'static str {
        self.id.namespace()
    }

    /// Span to enter while this object does work, so log lines are tagged
    /// with its id.
    pub fn logger(&self) -> &tracing::Span {
        &self.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_per_kind() {
        let a = RibbitObject::new("TestObjectKind");
        let b = RibbitObject::new("TestObjectKind");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.kind(), "TestObjectKind");
        assert_eq!(b.id().seq(), a.id().seq() + 1);
    }

    #[test]
    fn with_id_keeps_the_given_id() {
        let id = ObjectId::from_parts("Fixed", 7);
        let obj = RibbitObject::with_id(id);
        assert_eq!(obj.id(), id);
        assert_eq!(obj.kind(), "Fixed");
    }
}
