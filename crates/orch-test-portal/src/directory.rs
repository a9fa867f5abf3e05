//! Directory accessor group.

use sonic_orch_common::Directory;

/// Accessors over a [`Directory`] of any element type.
pub struct DirectoryInternal;

impl DirectoryInternal {
    /// Drops every entry. Values already handed out are unaffected.
    pub fn clear<T>(directory: &mut Directory<T>) {
        directory.clear();
    }

    pub fn is_empty<T>(directory: &Directory<T>) -> bool {
        directory.is_empty()
    }
}
