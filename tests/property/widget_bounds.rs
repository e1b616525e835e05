// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Widget Placement
//!
//! A widget is accepted exactly when it lies inside the layout grid, and a
//! rejected widget leaves the dashboard as it was.

use analytics_dashboard::domain::invariants::validate_widget_bounds;
use analytics_dashboard::domain::{
    Dashboard, DashboardLayout, ErrorCode, UserId, Widget, WidgetPosition, WidgetSize, WidgetType,
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn layout() -> impl Strategy<Value = DashboardLayout> {
    (1i32..12, 1i32..12).prop_map(|(columns, rows)| DashboardLayout {
        columns,
        rows,
        ..DashboardLayout::default()
    })
}

fn placement() -> impl Strategy<Value = (WidgetPosition, WidgetSize)> {
    (-2i32..14, -2i32..14, 1i32..6, 1i32..6).prop_map(|(x, y, width, height)| {
        (WidgetPosition { x, y }, WidgetSize { width, height })
    })
}

fn fits(layout: &DashboardLayout, position: &WidgetPosition, size: &WidgetSize) -> bool {
    position.x >= 0
        && position.y >= 0
        && position.x + size.width <= layout.columns
        && position.y + size.height <= layout.rows
}

proptest! {
    /// Property: Bounds check accepts exactly the widgets inside the grid
    #[test]
    fn prop_bounds_iff_inside_grid(layout in layout(), (position, size) in placement()) {
        let result = validate_widget_bounds(&layout, &position, &size);

        prop_assert_eq!(result.is_ok(), fits(&layout, &position, &size));
        if let Err(e) = result {
            prop_assert_eq!(e.code(), Some(ErrorCode::InvalidWidgetPosition));
        }
    }

    /// Property: Adding a widget is all-or-nothing
    #[test]
    fn prop_add_widget_all_or_nothing(
        layout in layout(),
        placements in prop::collection::vec(placement(), 1..10),
    ) {
        let now = Utc.with_ymd_and_hms(2026, 1, 19, 12, 0, 0).unwrap();
        let mut dashboard = Dashboard::new("d", "", UserId::from("u"), now);
        dashboard.update_layout(layout, now).expect("generated layouts are valid");
        dashboard.take_pending_events();

        for (position, size) in placements {
            let before = dashboard.clone();
            let widget = Widget::new(WidgetType::Kpi, "w", position, size);

            match dashboard.add_widget(widget, now) {
                Ok(()) => {
                    prop_assert!(fits(&layout, &position, &size));
                    prop_assert_eq!(dashboard.widgets.len(), before.widgets.len() + 1);
                    prop_assert_eq!(dashboard.version, before.version + 1);
                    dashboard.take_pending_events();
                }
                Err(_) => {
                    prop_assert!(!fits(&layout, &position, &size));
                    prop_assert_eq!(&dashboard, &before);
                }
            }
        }

        prop_assert!(dashboard.out_of_bounds_widgets().is_empty());
    }
}
