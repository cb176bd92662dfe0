use crate::error::{Result, TessellationError};

/// Default cap on the miter scale at ribbon corners.
const DEFAULT_MITER_LIMIT: f64 = 2.0;

/// Width and corner handling for ribbon tessellation.
#[derive(Debug, Clone, Copy)]
pub struct RibbonStyle {
    width: f64,
    miter_limit: f64,
}

impl RibbonStyle {
    /// Creates a new ribbon style with the default miter limit.
    ///
    /// # Errors
    ///
    /// Returns an error if `width` is not positive.
    pub fn new(width: f64) -> Result<Self> {
        if width <= 0.0 || !width.is_finite() {
            return Err(TessellationError::InvalidParameters(
                "ribbon width must be positive".to_owned(),
            )
            .into());
        }
        Ok(Self {
            width,
            miter_limit: DEFAULT_MITER_LIMIT,
        })
    }

    /// Sets the largest factor a corner offset may be stretched by.
    ///
    /// # Errors
    ///
    /// Returns an error if `limit` is less than 1.
    pub fn with_miter_limit(mut self, limit: f64) -> Result<Self> {
        if limit < 1.0 || !limit.is_finite() {
            return Err(TessellationError::InvalidParameters(
                "miter limit must be at least 1".to_owned(),
            )
            .into());
        }
        self.miter_limit = limit;
        Ok(self)
    }

    /// Returns the ribbon width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns half the ribbon width.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.width * 0.5
    }

    /// Returns the maximum miter scale applied at interior vertices.
    #[must_use]
    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }
}
