use std::marker::PhantomData;

/// The template syntax configuration.
///
/// Use [`Syntax::default()`] to get the default syntax configuration and
/// [`Syntax::builder()`] to create a custom syntax configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax<'a> {
    pub(crate) patterns: Vec<(Kind, String)>,
    _marker: PhantomData<&'a ()>,
}

/// A builder for the syntax configuration.
///
/// This struct is typically created using [`Syntax::builder()`].
#[derive(Debug, Clone)]
pub struct SyntaxBuilder<'a> {
    output: Option<(&'a str, &'a str)>,
    tag: Option<(&'a str, &'a str)>,
}

/// The kind of delimiter matched in the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    BeginOutput,
    EndOutput,
    BeginOutputTrim,
    EndOutputTrim,
    BeginTag,
    EndTag,
    BeginTagTrim,
    EndTagTrim,
}

impl Default for Syntax<'_> {
    /// Returns the default syntax configuration.
    ///
    /// This is equivalent to the following.
    /// ```
    /// use droplet::Syntax;
    ///
    /// let syntax = Syntax::builder()
    ///     .output("{{", "}}")
    ///     .tag("{%", "%}")
    ///     .build();
    /// assert_eq!(syntax, Syntax::default());
    /// ```
    #[inline]
    fn default() -> Self {
        Syntax::builder().output("{{", "}}").tag("{%", "%}").build()
    }
}

impl<'a> Syntax<'a> {
    /// Create a new syntax builder.
    ///
    /// # Examples
    ///
    /// ```
    /// let syntax = droplet::Syntax::builder()
    ///     .output("<{", "}>")
    ///     .tag("<[", "]>")
    ///     .build();
    /// ```
    #[inline]
    pub fn builder() -> SyntaxBuilder<'a> {
        SyntaxBuilder::new()
    }
}

impl<'a> SyntaxBuilder<'a> {
    /// Creates a new syntax builder.
    #[inline]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            output: None,
            tag: None,
        }
    }

    /// Set the output syntax, e.g. `{{ user.name }}`.
    ///
    /// If not set then output markers will not be available.
    ///
    /// # Panics
    ///
    /// If either of the strings are empty.
    #[inline]
    pub fn output(&mut self, begin: &'a str, end: &'a str) -> &mut Self {
        assert!(!begin.is_empty() && !end.is_empty());
        self.output = Some((begin, end));
        self
    }

    /// Set the tag syntax, e.g. `{% for item in list %}`.
    ///
    /// If not set then tags will not be available.
    ///
    /// # Panics
    ///
    /// If either of the strings are empty.
    #[inline]
    pub fn tag(&mut self, begin: &'a str, end: &'a str) -> &mut Self {
        assert!(!begin.is_empty() && !end.is_empty());
        self.tag = Some((begin, end));
        self
    }

    /// Builds the syntax configuration.
    pub fn build(&self) -> Syntax<'a> {
        let mut patterns = Vec::new();
        if let Some((begin, end)) = self.output {
            patterns.push((Kind::BeginOutput, begin.into()));
            patterns.push((Kind::EndOutput, end.into()));
            patterns.push((Kind::BeginOutputTrim, format!("{begin}-")));
            patterns.push((Kind::EndOutputTrim, format!("-{end}")));
        }
        if let Some((begin, end)) = self.tag {
            patterns.push((Kind::BeginTag, begin.into()));
            patterns.push((Kind::EndTag, end.into()));
            patterns.push((Kind::BeginTagTrim, format!("{begin}-")));
            patterns.push((Kind::EndTagTrim, format!("-{end}")));
        }
        Syntax {
            patterns,
            _marker: PhantomData,
        }
    }
}

impl Kind {
    /// Whether this delimiter opens an output marker or a tag.
    pub fn is_begin(&self) -> bool {
        matches!(
            self,
            Self::BeginOutput | Self::BeginOutputTrim | Self::BeginTag | Self::BeginTagTrim
        )
    }

    /// Whether this delimiter requests whitespace trimming on its outer side.
    pub fn is_trim(&self) -> bool {
        matches!(
            self,
            Self::BeginOutputTrim | Self::EndOutputTrim | Self::BeginTagTrim | Self::EndTagTrim
        )
    }

    /// Returns the closing delimiter kind that pairs with an opening one.
    pub fn end(&self) -> (Self, Self) {
        match self {
            Self::BeginOutput | Self::BeginOutputTrim => (Self::EndOutput, Self::EndOutputTrim),
            Self::BeginTag | Self::BeginTagTrim => (Self::EndTag, Self::EndTagTrim),
            kind => (*kind, *kind),
        }
    }

    pub fn human(&self) -> &'static str {
        match self {
            Self::BeginOutput | Self::BeginOutputTrim => "begin output",
            Self::EndOutput | Self::EndOutputTrim => "end output",
            Self::BeginTag | Self::BeginTagTrim => "begin tag",
            Self::EndTag | Self::EndTagTrim => "end tag",
        }
    }
}
