/// Display metrics a sheet lays its surfaces out against

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    /// Width of the element surfaces stretch to, in logical units
    pub container_width: f32,
    /// Device pixel ratio as reported by the host; may be bogus
    pub device_pixel_ratio: f32,
    /// Whether the host delivers touch events; resizes keep this as it was
    pub touch: bool,
}

impl ViewportMetrics {
    /// Device pixel ratio with the `|| 1` fallback applied.
    pub fn effective_dpr(&self) -> f32 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }
}

impl Default for ViewportMetrics {
    fn default() -> Self {
        Self {
            container_width: 640.0,
            device_pixel_ratio: 1.0,
            touch: false,
        }
    }
}

pub trait DisplayMetrics: Send + Sync {
    fn set_metrics(&self, m: ViewportMetrics);
    fn metrics(&self) -> ViewportMetrics;
}

/// In-process metrics holder updated from resize events.
pub struct SharedDisplay {
    metrics: std::sync::Mutex<ViewportMetrics>,
}

impl SharedDisplay {
    pub fn new(initial: ViewportMetrics) -> Self {
        SharedDisplay {
            metrics: std::sync::Mutex::new(initial),
        }
    }
}

impl Default for SharedDisplay {
    fn default() -> Self {
        Self::new(ViewportMetrics::default())
    }
}

impl DisplayMetrics for SharedDisplay {
    fn set_metrics(&self, m: ViewportMetrics) {
        let mut g = self.metrics.lock().unwrap_or_else(|e| e.into_inner());
        *g = m;
    }

    fn metrics(&self) -> ViewportMetrics {
        *self.metrics.lock().unwrap_or_else(|e| e.into_inner())
    }
}
