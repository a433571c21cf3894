//! `A includes B;` statements. These exist only as IR; the mixin-merge
//! phase consumes them and nothing of them survives into the database.

use serde::{Deserialize, Serialize};
use widl_common::{Component, DebugInfo, Identifier};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IncludesIr {
    pub interface: Identifier,
    pub mixin: Identifier,
    pub component: Component,
    pub debug_info: DebugInfo,
}

impl IncludesIr {
    pub fn new(
        interface: Identifier,
        mixin: Identifier,
        component: Component,
        debug_info: DebugInfo,
    ) -> Self {
        IncludesIr {
            interface,
            mixin,
            component,
            debug_info,
        }
    }
}
