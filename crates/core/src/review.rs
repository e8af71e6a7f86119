// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Admin review queue for crowd reports.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use trail_france_domain::{Report, ReportStatus};

/// Pending reports for one race, as shown to admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportGroup {
    /// The reported race.
    pub race_id: String,
    /// Race name from the most recent report.
    pub race_name: String,
    /// Pending reports in submission order.
    pub reports: Vec<Report>,
    /// Number of reports in the group.
    pub count: usize,
}

impl ReportGroup {
    fn latest(&self) -> Option<&Report> {
        self.reports.last()
    }
}

/// Groups pending reports by race.
///
/// Reports keep submission order inside a group. Groups are ordered by
/// their most recent report, newest first. Reports that are not pending
/// are ignored.
#[must_use]
pub fn group_pending_reports(mut reports: Vec<Report>) -> Vec<ReportGroup> {
    reports.sort_by_key(|r| r.id);

    let mut groups: Vec<ReportGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for report in reports
        .into_iter()
        .filter(|r| r.status == ReportStatus::Pending)
    {
        if let Some(&position) = positions.get(&report.race_id) {
            let group: &mut ReportGroup = &mut groups[position];
            group.race_name.clone_from(&report.race_name);
            group.reports.push(report);
        } else {
            positions.insert(report.race_id.clone(), groups.len());
            groups.push(ReportGroup {
                race_id: report.race_id.clone(),
                race_name: report.race_name.clone(),
                reports: vec![report],
                count: 0,
            });
        }
    }

    for group in &mut groups {
        group.count = group.reports.len();
    }

    groups.sort_by(|a, b| {
        let key = |g: &ReportGroup| g.latest().map(|r| (r.created_at.clone(), r.id));
        key(b).cmp(&key(a))
    });
    groups
}
