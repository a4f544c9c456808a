//! Rank-based auto-layout for the canvas.
//!
//! Positions are view state only; scheduling never reads them.

use crate::config::{
    CANVAS_PADDING_X, CANVAS_PADDING_Y, COLUMN_SPACING, CONTENT_FOCUS_PADDING, ROW_SPACING,
};
use crate::graph::calculate_ranks;
use crate::model::project::Project;
use std::collections::BTreeMap;

/// Places tasks in one column per rank, keeping their vertical order.
///
/// Within a column tasks are ordered by current `y` (then id) and spaced
/// evenly. The camera then jumps to the arranged content.
pub fn arrange_tasks(project: &mut Project) {
    if project.tasks.is_empty() {
        return;
    }

    let ranks = calculate_ranks(project);
    let mut columns: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (position, task) in project.tasks.iter().enumerate() {
        let rank = ranks.get(&task.id).copied().unwrap_or(0);
        columns.entry(rank).or_default().push(position);
    }

    for (column, mut members) in columns {
        members.sort_by(|&a, &b| {
            let (left, right) = (&project.tasks[a], &project.tasks[b]);
            left.y.total_cmp(&right.y).then(left.id.cmp(&right.id))
        });
        for (row, position) in members.into_iter().enumerate() {
            let task = &mut project.tasks[position];
            task.x = CANVAS_PADDING_X + f64::from(column) * COLUMN_SPACING;
            task.y = CANVAS_PADDING_Y + row as f64 * ROW_SPACING;
        }
    }

    focus_on_content(project);
}

/// Pans the camera so the top-left task sits at the focus padding.
pub fn focus_on_content(project: &mut Project) {
    let min_x = project.tasks.iter().map(|task| task.x).reduce(f64::min);
    let min_y = project.tasks.iter().map(|task| task.y).reduce(f64::min);
    if let (Some(min_x), Some(min_y)) = (min_x, min_y) {
        project.camera.x = CONTENT_FOCUS_PADDING - min_x * project.zoom;
        project.camera.y = CONTENT_FOCUS_PADDING - min_y * project.zoom;
    }
}
