use serde_json::json;
use pulsebar::{
    CollectingListener, EventKind, OptionsPatch, ProgressWidget, Surface, ValueChange,
    WidgetError, WidgetOptions, WidgetPlugin, WidgetRuntime,
};

fn instant_options() -> WidgetOptions {
    WidgetOptions {
        animated: false,
        ..WidgetOptions::default()
    }
}

fn mk_widget(runtime: &WidgetRuntime, options: WidgetOptions) -> (ProgressWidget, Surface) {
    let surface = Surface::detached();
    let widget = ProgressWidget::new(runtime, surface.clone(), options).unwrap();
    (widget, surface)
}

#[test]
fn basic_set_reads_back_value_and_percentage() {
    let runtime = WidgetRuntime::new();
    let (widget, _surface) = mk_widget(&runtime, instant_options());

    widget.set_value_with(50.0, false).unwrap();
    assert_eq!(widget.value(), 50.0);
    assert_eq!(widget.percentage(), 50.0);
}

#[test]
fn values_always_clamp_into_range() {
    let runtime = WidgetRuntime::new();
    let (widget, _surface) = mk_widget(
        &runtime,
        WidgetOptions {
            animated: false,
            min: 20.0,
            max: 80.0,
            value: 20.0,
            ..WidgetOptions::default()
        },
    );

    for raw in [-1000.0, -20.0, 0.0, 19.9, 42.0, 80.0, 81.0, f64::INFINITY] {
        widget.set_value(raw).unwrap();
        let value = widget.value();
        assert!((20.0..=80.0).contains(&value), "value {value} left range");
    }
    widget.set_value(f64::NAN).unwrap();
    assert!((20.0..=80.0).contains(&widget.value()));
}

#[test]
fn complete_fires_once_per_arrival_at_max() {
    let runtime = WidgetRuntime::new();
    let (widget, _surface) = mk_widget(&runtime, instant_options());
    let completes = CollectingListener::new();
    widget.on(EventKind::Complete, completes.listener());

    widget.set_value(150.0).unwrap();
    assert_eq!(completes.event_count(), 1);

    // Already at max; rule 2 makes this silent
    widget.set_value(100.0).unwrap();
    assert_eq!(completes.event_count(), 1);

    widget.set_value(10.0).unwrap();
    widget.set_value(100.0).unwrap();
    assert_eq!(completes.event_count(), 2);
}

#[test]
fn destroy_then_mutate_is_silent() {
    let runtime = WidgetRuntime::new();
    let (widget, _surface) = mk_widget(&runtime, instant_options());

    widget.set_value(30.0).unwrap();
    widget.destroy().unwrap();
    widget.set_value(10.0).unwrap();
    widget.increment(5.0).unwrap();
    widget.reset().unwrap();
    assert_eq!(widget.value(), 30.0);
    assert!(widget.is_destroyed());
}

#[test]
fn linear_markup_tracks_the_value() {
    let runtime = WidgetRuntime::new();
    let (widget, surface) = mk_widget(
        &runtime,
        WidgetOptions {
            animated: false,
            show_text: true,
            format: "{percent}% done".to_string(),
            ..WidgetOptions::default()
        },
    );

    widget.set_value(37.5).unwrap();

    let tree = surface.snapshot();
    assert_eq!(tree.attr("shape"), Some("linear"));
    let fill = tree.find("fill").unwrap();
    assert_eq!(fill.attr("width"), Some("37.50%"));
    let label = tree.find("label").unwrap();
    assert_eq!(label.text.as_deref(), Some("37.5% done"));
}

#[test]
fn dial_markup_sweeps_the_needle() {
    let runtime = WidgetRuntime::new();
    let (widget, surface) = mk_widget(
        &runtime,
        WidgetOptions {
            animated: false,
            shape: "dial".to_string(),
            ..WidgetOptions::default()
        },
    );

    // Midpoint of the 270 degree sweep is straight up
    widget.set_value(50.0).unwrap();
    let needle = surface.snapshot().find("needle").unwrap().clone();
    assert_eq!(needle.attr("angle"), Some("0.0"));

    widget.set_value(100.0).unwrap();
    let needle = surface.snapshot().find("needle").unwrap().clone();
    assert_eq!(needle.attr("angle"), Some("135.0"));
}

#[test]
fn theme_and_class_ride_on_the_root() {
    let runtime = WidgetRuntime::new();
    let (_widget, surface) = mk_widget(
        &runtime,
        WidgetOptions {
            animated: false,
            theme: Some("dark".to_string()),
            class_name: Some("upload-bar".to_string()),
            ..WidgetOptions::default()
        },
    );

    assert_eq!(surface.attr("theme").as_deref(), Some("dark"));
    assert_eq!(surface.attr("class").as_deref(), Some("upload-bar"));
}

#[test]
fn update_options_switches_shape_and_retheme() {
    let runtime = WidgetRuntime::new();
    let (widget, surface) = mk_widget(&runtime, instant_options());
    widget.set_value(25.0).unwrap();

    let patch = OptionsPatch {
        shape: Some("dial".to_string()),
        theme: Some("ocean".to_string()),
        ..OptionsPatch::default()
    };
    widget.update_options(&patch).unwrap();

    let tree = surface.snapshot();
    assert_eq!(tree.attr("shape"), Some("dial"));
    assert_eq!(tree.attr("theme"), Some("ocean"));
    assert!(tree.find("needle").is_some());
    assert!(tree.find("fill").is_none());
    // Value carried across the remount
    assert_eq!(widget.value(), 25.0);
}

#[test]
fn update_options_toggles_label_visibility() {
    let runtime = WidgetRuntime::new();
    let (widget, surface) = mk_widget(&runtime, instant_options());
    assert!(surface.snapshot().find("label").is_none());

    widget
        .update_options(&OptionsPatch {
            show_text: Some(true),
            format: Some("{value}/{max}".to_string()),
            ..OptionsPatch::default()
        })
        .unwrap();
    widget.set_value(40.0).unwrap();

    let label = surface.snapshot().find("label").unwrap().clone();
    assert_eq!(label.text.as_deref(), Some("40/100"));
}

#[test]
fn destroy_clears_owned_markup() {
    let runtime = WidgetRuntime::new();
    let (widget, surface) = mk_widget(
        &runtime,
        WidgetOptions {
            animated: false,
            theme: Some("dark".to_string()),
            ..WidgetOptions::default()
        },
    );
    widget.set_value(60.0).unwrap();
    assert!(!surface.snapshot().children.is_empty());

    widget.destroy().unwrap();
    let tree = surface.snapshot();
    assert!(tree.children.is_empty());
    assert_eq!(tree.attr("shape"), None);
    assert_eq!(tree.attr("theme"), None);
}

#[test]
fn plugins_and_middleware_compose_in_order() {
    struct Floor;
    impl WidgetPlugin for Floor {
        fn before_value_change(
            &mut self,
            change: &ValueChange,
        ) -> Result<Option<f64>, WidgetError> {
            Ok(Some(change.to.max(10.0)))
        }
    }

    let runtime = WidgetRuntime::new();
    let widget = ProgressWidget::builder(&runtime)
        .animated(false)
        .plugin("floor", Box::new(Floor))
        .middleware(|v| v + 1.0)
        .build()
        .unwrap();

    // Hook floors to 10, then middleware bumps to 11
    widget.set_value(2.0).unwrap();
    assert_eq!(widget.value(), 11.0);
}

#[test]
fn plugin_configure_receives_install_options() {
    #[derive(Default)]
    struct Threshold {
        limit: f64,
    }
    impl WidgetPlugin for Threshold {
        fn configure(&mut self, options: &serde_json::Value) -> Result<(), WidgetError> {
            self.limit = options
                .get("limit")
                .and_then(serde_json::Value::as_f64)
                .ok_or_else(|| WidgetError::new("threshold plugin needs a limit"))?;
            Ok(())
        }
        fn before_value_change(
            &mut self,
            change: &ValueChange,
        ) -> Result<Option<f64>, WidgetError> {
            Ok(Some(change.to.min(self.limit)))
        }
    }

    let runtime = WidgetRuntime::new();
    let widget = ProgressWidget::builder(&runtime)
        .animated(false)
        .plugin_with("threshold", Box::new(Threshold::default()), json!({"limit": 70.0}))
        .build()
        .unwrap();

    widget.set_value(95.0).unwrap();
    assert_eq!(widget.value(), 70.0);
}

#[test]
fn failing_listener_aborts_the_call_but_state_is_applied() {
    let runtime = WidgetRuntime::new();
    let (widget, _surface) = mk_widget(&runtime, instant_options());
    widget.on(EventKind::Change, |_| {
        Err(WidgetError::new("listener rejected"))
    });

    let err = widget.set_value(25.0).unwrap_err();
    assert!(matches!(err, WidgetError::ListenerFailed { .. }));
    // The value landed before the listener ran
    assert_eq!(widget.value(), 25.0);
}

#[test]
fn free_form_options_are_stored_and_readable() {
    let runtime = WidgetRuntime::new();
    let (widget, _surface) = mk_widget(
        &runtime,
        WidgetOptions {
            animated: false,
            extra: [("orientation".to_string(), json!("vertical"))]
                .into_iter()
                .collect(),
            ..WidgetOptions::default()
        },
    );

    assert_eq!(widget.get_option("orientation"), Some(json!("vertical")));
    assert_eq!(widget.get_option("min"), Some(json!(0.0)));
    assert_eq!(widget.get_option("unknown"), None);
}
