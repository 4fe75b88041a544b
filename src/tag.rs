//! Defines the [`Tag`] type, which groups the [`BlogPage`]s mentioning a
//! label, and [`index_tags`], which builds the full set of tags.

use crate::page::{page_name, BlogPage};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// A tag label and the entries that mention it. Targets are positions in the
/// slice of [`BlogPage`]s the tag was indexed from, in discovery order.
#[derive(Clone, Debug)]
pub struct Tag {
    label: String,
    targets: Vec<usize>,
}

impl Tag {
    pub fn new(label: &str) -> Tag {
        Tag {
            label: label.trim().to_owned(),
            targets: Vec::new(),
        }
    }

    pub fn add_target(&mut self, target: usize) {
        self.targets.push(target);
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// The tag page's file name, derived from the label like
    /// [`crate::page::page_name`].
    pub fn page_name(&self) -> String {
        page_name(&self.label)
    }
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `label`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `label` field.
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}
impl Eq for Tag {}

/// Indexes `pages` by tag in a single pass. Labels are trimmed and compared
/// exactly. A page is appended to a tag once per mention, so a page listing
/// the same tag twice is a target twice. The result is sorted by label.
pub fn index_tags(pages: &[BlogPage]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (i, page) in pages.iter().enumerate() {
        for label in page.tags() {
            let label = label.trim();
            match positions.get(label) {
                Some(&position) => tags[position].add_target(i),
                None => {
                    let mut tag = Tag::new(label);
                    tag.add_target(i);
                    positions.insert(tag.label.clone(), tags.len());
                    tags.push(tag);
                }
            }
        }
    }

    tags.sort_by(|a, b| a.label.cmp(&b.label));
    tags
}
