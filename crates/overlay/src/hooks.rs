use crate::OverlayController;

/// Integration points invoked after a transition has fully applied.
///
/// Both methods run synchronously as the last step of a successful
/// transition, with no controller lock held, so they may call back into the
/// controller.
pub trait OverlayHooks: Send + Sync {
	fn on_open(&self, overlay: &OverlayController) {
		let _ = overlay;
	}

	fn on_close(&self, overlay: &OverlayController) {
		let _ = overlay;
	}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl OverlayHooks for NoopHooks {}

/// Boxed hook callback.
pub type HookFn = Box<dyn Fn(&OverlayController) + Send + Sync>;

/// Hooks backed by optional closures.
#[derive(Default)]
pub struct FnHooks {
	pub on_open: Option<HookFn>,
	pub on_close: Option<HookFn>,
}

impl OverlayHooks for FnHooks {
	fn on_open(&self, overlay: &OverlayController) {
		if let Some(f) = &self.on_open {
			f(overlay);
		}
	}

	fn on_close(&self, overlay: &OverlayController) {
		if let Some(f) = &self.on_close {
			f(overlay);
		}
	}
}
