//! Tag predicates for selecting render objects.

use crate::error::RenderError;

/// Maximum number of tags in a predicate or a material.
pub const MAX_TAG_COUNT: usize = 32;

/// A bounded set of tags selecting which render objects a draw executes.
///
/// An object matches if any of its material's tags is in the predicate.
/// An empty predicate matches every object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Predicate {
    tags: [u32; MAX_TAG_COUNT],
    tag_count: usize,
}

impl Predicate {
    /// Maximum number of tags in a predicate or a material.
    pub const MAX_TAG_COUNT: usize = MAX_TAG_COUNT;

    /// Create an empty predicate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a predicate from a list of tags.
    pub fn from_tags(tags: &[u32]) -> Result<Self, RenderError> {
        let mut predicate = Self::new();
        for &tag in tags {
            predicate.add_tag(tag)?;
        }
        Ok(predicate)
    }

    /// Add a tag. Adding a tag already present is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::BufferIsFull`] once [`Self::MAX_TAG_COUNT`]
    /// distinct tags are stored.
    pub fn add_tag(&mut self, tag: u32) -> Result<(), RenderError> {
        if self.contains(tag) {
            return Ok(());
        }
        if self.tag_count == Self::MAX_TAG_COUNT {
            return Err(RenderError::BufferIsFull);
        }
        self.tags[self.tag_count] = tag;
        self.tag_count += 1;
        Ok(())
    }

    /// Tags in insertion order.
    pub fn tags(&self) -> &[u32] {
        &self.tags[..self.tag_count]
    }

    /// Returns true if the predicate holds no tags.
    pub fn is_empty(&self) -> bool {
        self.tag_count == 0
    }

    /// Returns true if `tag` is in the predicate.
    pub fn contains(&self, tag: u32) -> bool {
        self.tags().contains(&tag)
    }

    /// Check a tag set against the predicate.
    pub fn matches(&self, tags: &[u32]) -> bool {
        self.is_empty() || tags.iter().any(|&tag| self.contains(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_matches_everything() {
        let predicate = Predicate::new();
        assert!(predicate.matches(&[]));
        assert!(predicate.matches(&[7]));
    }

    #[test]
    fn test_any_overlap() {
        let predicate = Predicate::from_tags(&[1, 2]).unwrap();
        assert!(predicate.matches(&[2, 9]));
        assert!(!predicate.matches(&[3, 4]));
        assert!(!predicate.matches(&[]));
    }

    #[test]
    fn test_capacity() {
        let mut predicate = Predicate::from_tags(&(0..32).collect::<Vec<_>>()).unwrap();
        assert_eq!(predicate.tags().len(), Predicate::MAX_TAG_COUNT);
        assert!(predicate.add_tag(5).is_ok());
        assert_eq!(predicate.add_tag(100), Err(RenderError::BufferIsFull));
    }
}
