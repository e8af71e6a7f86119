// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use trail_france::ReportingPolicy;

/// Process-wide engine settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Quorum and lookback window for crowd reports.
    pub policy: ReportingPolicy,
    /// Where admin notifications go. Empty disables them.
    pub admin_email: String,
}

impl EngineConfig {
    #[must_use]
    pub const fn new(policy: ReportingPolicy, admin_email: String) -> Self {
        Self {
            policy,
            admin_email,
        }
    }

    /// The admin address, or `None` when admin notifications are disabled.
    #[must_use]
    pub fn admin_recipient(&self) -> Option<&str> {
        let email: &str = self.admin_email.trim();
        if email.is_empty() { None } else { Some(email) }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(ReportingPolicy::default(), String::new())
    }
}
