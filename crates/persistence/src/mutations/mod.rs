// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write operations, one module per table family.

pub mod accounts;
pub mod favorites;
pub mod races;
pub mod reports;

/// Generates an opaque identifier: 32 lowercase hex digits of randomness.
pub(crate) fn generate_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}
