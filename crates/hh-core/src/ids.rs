use serde::Deserialize;
use serde::Serialize;
use std::marker::PhantomData;

/// A type-tagged opaque identifier. `ID<Table>` and `ID<Hand>` are distinct
/// types at compile time even though both wrap the same `Uuid`.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct ID<T> {
    inner: uuid::Uuid,
    #[serde(skip)]
    marker: PhantomData<fn() -> T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::new_v4(),
            marker: PhantomData,
        }
    }
}

impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}
impl<T> Eq for ID<T> {}
impl<T> std::hash::Hash for ID<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state)
    }
}
impl<T> std::fmt::Debug for ID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}
impl<T> std::fmt::Display for ID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

/// A monotonic hand label of the form `H-<yyyymmdd>-<zero-padded-seq>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandId(String);

impl HandId {
    pub fn new(date: &str, sequence: u64) -> Self {
        Self(format!("H-{date}-{sequence:06}"))
    }
}

impl std::fmt::Display for HandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for HandId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_id_zero_pads_sequence() {
        let id = HandId::new("20260727", 7);
        assert_eq!(id.to_string(), "H-20260727-000007");
    }

    #[test]
    fn ids_of_same_type_compare_by_inner_uuid() {
        struct Table;
        let a: ID<Table> = ID::default();
        let b: ID<Table> = a;
        assert_eq!(a, b);
    }
}
