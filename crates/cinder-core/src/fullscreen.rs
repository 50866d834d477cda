//! Fullscreen capability negotiation
//!
//! Browsers expose fullscreen under several vendor names. Instead of probing
//! at every toggle, the names are resolved once per attach into a
//! [`FullscreenCapabilities`] value. Each column (request, exit, element,
//! change event) resolves on its own to the first vendor that has it.

use crate::platform::FullscreenSurface;
use tracing::debug;

/// Vendor variants of the Fullscreen API, in probe order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FullscreenVendor {
    Standard,
    Moz,
    Webkit,
    Ms,
}

impl FullscreenVendor {
    pub const PROBE_ORDER: [FullscreenVendor; 4] = [
        FullscreenVendor::Standard,
        FullscreenVendor::Moz,
        FullscreenVendor::Webkit,
        FullscreenVendor::Ms,
    ];

    /// Request method on the container element
    pub fn request_method(&self) -> &'static str {
        match self {
            FullscreenVendor::Standard => "requestFullscreen",
            FullscreenVendor::Moz => "mozRequestFullScreen",
            FullscreenVendor::Webkit => "webkitRequestFullscreen",
            FullscreenVendor::Ms => "msRequestFullscreen",
        }
    }

    /// Exit method on the document
    pub fn exit_method(&self) -> &'static str {
        match self {
            FullscreenVendor::Standard => "exitFullscreen",
            FullscreenVendor::Moz => "mozCancelFullScreen",
            FullscreenVendor::Webkit => "webkitExitFullscreen",
            FullscreenVendor::Ms => "msExitFullscreen",
        }
    }

    /// Fullscreen element property on the document
    pub fn element_property(&self) -> &'static str {
        match self {
            FullscreenVendor::Standard => "fullscreenElement",
            FullscreenVendor::Moz => "mozFullScreenElement",
            FullscreenVendor::Webkit => "webkitFullscreenElement",
            FullscreenVendor::Ms => "msFullscreenElement",
        }
    }

    /// Change event fired on the document
    pub fn change_event(&self) -> &'static str {
        match self {
            FullscreenVendor::Standard => "fullscreenchange",
            FullscreenVendor::Moz => "mozfullscreenchange",
            FullscreenVendor::Webkit => "webkitfullscreenchange",
            FullscreenVendor::Ms => "MSFullscreenChange",
        }
    }

    /// Handler slot used to detect support for the change event
    pub fn change_handler_slot(&self) -> String {
        format!("on{}", self.change_event().to_ascii_lowercase())
    }
}

/// Resolved fullscreen entry points for one surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullscreenCapabilities {
    request: Option<FullscreenVendor>,
    exit: Option<FullscreenVendor>,
    element: Option<FullscreenVendor>,
    change: Option<FullscreenVendor>,
}

impl FullscreenCapabilities {
    /// Nothing available; toggling is a no-op
    pub fn none() -> Self {
        Self::default()
    }

    /// Probe `surface` once and keep the first available entry per column
    pub fn negotiate(surface: &dyn FullscreenSurface) -> Self {
        let request = first_supported(|v| surface.container_supports(v.request_method()));
        let exit = first_supported(|v| surface.document_supports(v.exit_method()));
        let element = first_supported(|v| surface.document_supports(v.element_property()));
        // Handler slots are not exposed everywhere; listening on the event
        // that matches the request vendor is the best remaining guess.
        let change =
            first_supported(|v| surface.document_supports(&v.change_handler_slot())).or(request);

        let caps = Self {
            request,
            exit,
            element,
            change,
        };
        debug!(?caps, "Fullscreen capabilities negotiated");
        caps
    }

    pub fn request_method(&self) -> Option<&'static str> {
        self.request.map(|v| v.request_method())
    }

    pub fn exit_method(&self) -> Option<&'static str> {
        self.exit.map(|v| v.exit_method())
    }

    pub fn element_property(&self) -> Option<&'static str> {
        self.element.map(|v| v.element_property())
    }

    pub fn change_event(&self) -> Option<&'static str> {
        self.change.map(|v| v.change_event())
    }

    /// Whether entering fullscreen is possible at all
    pub fn can_request(&self) -> bool {
        self.request.is_some()
    }

    /// Read the document's current fullscreen state
    pub fn is_fullscreen(&self, surface: &dyn FullscreenSurface) -> bool {
        self.element_property()
            .is_some_and(|prop| surface.has_fullscreen_element(prop))
    }
}

fn first_supported(probe: impl Fn(FullscreenVendor) -> bool) -> Option<FullscreenVendor> {
    FullscreenVendor::PROBE_ORDER.into_iter().find(|v| probe(*v))
}
