// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries, one module per table family.

pub mod accounts;
pub mod favorites;
pub mod races;
pub mod reports;
