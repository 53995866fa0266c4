use std::rc::Rc;

/// One frame in a compile-time call chain: the macro-expansion stack active when a word was
/// placed or a label was referenced. `previous` points outward, toward the original source line
/// that started the expansion; the frame a `ProgramTraceback` points to directly is the innermost
/// one.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Where this line came from: a file path, or a synthetic name for a macro body.
    pub origin: String,
    /// The literal source line text that produced this frame.
    pub line_text: String,
    /// 1-based line number within `origin`.
    pub line_number: usize,
    /// Whether the macro that expanded to this frame was defined with `DEFINE INTERNAL_COMMAND`.
    /// Internal frames are skipped when picking the user-facing frame for a report.
    pub internal: bool,
    /// The nearest enclosing global label in scope when this frame was produced, used to resolve
    /// local label references relative to it.
    pub global_label: Option<String>,
    /// The caller's frame, if this frame was produced inside a macro expansion.
    pub previous: Option<ProgramTraceback>,
}

/// A linked chain of [`Frame`]s, innermost held directly, walking outward via `previous`.
#[derive(Debug, Clone)]
pub struct ProgramTraceback(Rc<Frame>);

impl ProgramTraceback {
    /// Builds a new innermost frame, chained onto `previous` (the call site that led here, if
    /// any).
    pub fn new(
        origin: impl Into<String>,
        line_text: impl Into<String>,
        line_number: usize,
        internal: bool,
        global_label: Option<String>,
        previous: Option<ProgramTraceback>,
    ) -> Self {
        ProgramTraceback(Rc::new(Frame {
            origin: origin.into(),
            line_text: line_text.into(),
            line_number,
            internal,
            global_label,
            previous,
        }))
    }

    /// The innermost frame of this chain.
    pub fn frame(&self) -> &Frame {
        &self.0
    }

    /// The innermost frame whose defining macro was not marked internal; the default user-facing
    /// frame for diagnostics and for the debugger's local-label resolution.
    pub fn deepest_non_internal(&self) -> &Frame {
        let mut current = self;
        loop {
            if !current.0.internal {
                return &current.0;
            }
            match &current.0.previous {
                Some(previous) => current = previous,
                None => return &current.0,
            }
        }
    }

    /// Renders the full chain, outermost first, as one line per frame: `origin:line  text`.
    pub fn render(&self) -> String {
        let mut frames = Vec::new();
        let mut current = Some(self);
        while let Some(tb) = current {
            frames.push(tb.0.clone());
            current = tb.0.previous.as_ref();
        }
        frames
            .iter()
            .rev()
            .map(|f| format!("  {}:{}  {}", f.origin, f.line_number, f.line_text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
