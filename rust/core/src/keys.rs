// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handle types for arena-based storage.
//!
//! Entity sets and tag definitions get unique, type-safe keys created by
//! `slotmap::SlotMap`. Keys are generational: a key from one database never
//! silently aliases an entity in another database of a different size.

use slotmap::new_key_type;

new_key_type! {
    /// Opaque handle to an entity set (volume, surface, group, file set).
    pub struct EntityKey;

    /// Opaque handle to a tag definition.
    pub struct TagKey;
}
