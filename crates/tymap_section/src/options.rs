// -----------------------------------------------------------------------------
// SectionOptions

/// Formatting options handed to every per-type serializer.
///
/// # Examples
///
/// ```
/// use tymap_section::SectionOptions;
///
/// let options = SectionOptions::new().with_output_nulls(true);
/// assert!(options.output_nulls);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct SectionOptions {
    /// Whether struct fields holding `None` are written
    /// as [`Section::Null`](crate::Section::Null).
    ///
    /// Defaults to `false`: such fields are left out of the map, and are read
    /// back as missing fields.
    pub output_nulls: bool,
}

impl SectionOptions {
    /// Creates the default options.
    #[inline]
    pub const fn new() -> Self {
        Self {
            output_nulls: false,
        }
    }

    /// Sets [`output_nulls`](Self::output_nulls).
    #[inline]
    pub const fn with_output_nulls(mut self, output_nulls: bool) -> Self {
        self.output_nulls = output_nulls;
        self
    }
}
