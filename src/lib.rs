//! Pulsebar core (host-agnostic)
//!
//! Engine for animated progress widgets: configuration with clamping and
//! percentage math, a coalescing frame scheduler, eased tweens, plugin
//! and middleware pipelines around every value change, typed lifecycle
//! events, and pluggable shape renderers drawing into a retained surface
//! tree. Cross-instance coordinators (synchronizer, chain, group) and a
//! completion-time predictor sit on top of the single-widget engine.
//!
//! ```
//! use pulsebar::{ProgressWidget, WidgetRuntime};
//!
//! let runtime = WidgetRuntime::new();
//! let widget = ProgressWidget::builder(&runtime)
//!     .animated(false)
//!     .on_change(|event| {
//!         println!("progress at {}", event.value);
//!         Ok(())
//!     })
//!     .build()?;
//!
//! widget.set_value(42.0)?;
//! assert_eq!(widget.value(), 42.0);
//! assert_eq!(widget.percentage(), 42.0);
//! # Ok::<(), pulsebar::WidgetError>(())
//! ```
//!
//! Animated widgets step through [`WidgetRuntime::run_frame`]; hosts
//! call it once per rendering tick with a monotonic timestamp.

pub mod animation;
pub mod config;
pub mod coordination;
pub mod easing;
pub mod error;
pub mod event;
pub mod ids;
pub mod monitor;
pub mod pipeline;
pub mod predictor;
pub mod render;
pub mod runtime;
pub mod time;
pub mod widget;

// Re-exports for consumers (adapters)
pub use animation::{
    AnimationController, FrameCallback, FrameScheduler, TweenFrame, TweenSpec, TweenStart,
};
pub use config::{ConfigManager, OptionsPatch, WidgetOptions};
pub use coordination::{ProgressChain, ProgressGroup, ProgressSynchronizer, SyncMode};
pub use easing::{
    BezierEase, CubicEase, EaseIn, EaseInOut, EaseOut, EasingFunction, EasingRegistry, LinearEase,
    SpringEase, StepEase,
};
pub use error::WidgetError;
pub use event::{CollectingListener, EventEmitter, EventKind, ListenerFn, SharedListener, WidgetEvent};
pub use ids::{FrameHandle, IdAllocator, ListenerId, WidgetId};
pub use monitor::{LifecycleMonitor, WidgetMetrics};
pub use pipeline::{MiddlewareManager, PluginContext, PluginManager, ValueChange, WidgetPlugin};
pub use predictor::{Prediction, PredictorOptions, ProgressPredictor};
pub use render::{
    DialShape, LabelFormatter, LinearShape, RecordingShape, RenderFrame, RenderOp, RendererFactory,
    RendererRegistry, ShapeRenderer, Surface, SurfaceNode, Target,
};
pub use runtime::WidgetRuntime;
pub use time::TickTime;
pub use widget::{ProgressWidget, WidgetBuilder};

pub type Result<T> = core::result::Result<T, WidgetError>;
