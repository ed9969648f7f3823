use ahash::AHashSet;
use smol_str::SmolStr;

/// Export visibility of a scope. `Capital` exports names starting with
/// an uppercase letter, `Any` exports every newly defined name; an
/// explicit export list restricts either to the enumerated names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExportMode {
    None,
    Capital,
    Any,
}

pub struct Scope {
    pub mode: ExportMode,
    pub vars: AHashSet<SmolStr>,
    /// Shadowing allow-list from `using`: when present, names not
    /// listed stop the outward lookup at this scope.
    pub allows: Option<AHashSet<SmolStr>>,
    pub exports: Option<AHashSet<SmolStr>>,
}

impl Scope {
    fn new() -> Scope {
        Scope {
            mode: ExportMode::None,
            vars: AHashSet::new(),
            allows: None,
            exports: None,
        }
    }
}

/// Lexical scope stack for lowering; the back is the innermost scope.
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> ScopeStack {
        ScopeStack { scopes: Vec::new() }
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::new());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn clear(&mut self) {
        self.scopes.clear();
    }

    /// Walks from the innermost scope outward. An export mode on the
    /// current scope can define a matching name on first sight; an
    /// `allows` set acts as a transparent barrier: listed names stay
    /// visible through it, others terminate the search.
    pub fn is_defined(&mut self, name: &str) -> bool {
        let mut defined = false;
        let required = if name.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            ExportMode::Capital
        } else {
            ExportMode::Any
        };
        if let Some(current) = self.scopes.last_mut() {
            if current.mode >= required {
                match &current.exports {
                    Some(exports) => {
                        if exports.contains(name) {
                            defined = true;
                            current.vars.insert(SmolStr::new(name));
                        }
                    }
                    None => {
                        defined = true;
                        current.vars.insert(SmolStr::new(name));
                    }
                }
            }
        }
        let mut allowed = None;
        for scope in self.scopes.iter().rev() {
            if let Some(allows) = &scope.allows {
                allowed = Some(allows.contains(name));
            }
        }
        let shadow_scope_only = allowed == Some(false);
        for scope in self.scopes.iter().rev() {
            if scope.vars.contains(name) {
                defined = true;
                break;
            }
            if shadow_scope_only && scope.allows.is_some() {
                break;
            }
        }
        defined
    }

    /// Plain lookup without export-mode side effects or allow-list
    /// barriers; used by the fresh-name generator.
    pub fn is_solid_defined(&self, name: &str) -> bool {
        self.scopes
            .iter()
            .rev()
            .any(|scope| scope.vars.contains(name))
    }

    /// Returns true iff the name becomes newly defined in the current
    /// scope; the caller then emits a `local` for it.
    pub fn add_to_scope(&mut self, name: &str) -> bool {
        if self.is_defined(name) {
            return false;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.vars.insert(SmolStr::new(name));
        }
        true
    }

    /// Adds unconditionally; used for function-parameter slots.
    pub fn force_add(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.vars.insert(SmolStr::new(name));
        }
    }

    pub fn mark_shadowed(&mut self) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.allows = Some(AHashSet::new());
        }
    }

    pub fn add_to_allow_list(&mut self, name: &str) {
        if let Some(allows) = self.scopes.last_mut().and_then(|s| s.allows.as_mut()) {
            allows.insert(SmolStr::new(name));
        }
    }

    pub fn mark_exported(&mut self, mode: ExportMode, enumerated: bool) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.mode = mode;
            if enumerated && scope.exports.is_none() {
                scope.exports = Some(AHashSet::new());
            }
        }
    }

    pub fn add_exported(&mut self, name: &str) {
        if let Some(exports) = self.scopes.last_mut().and_then(|s| s.exports.as_mut()) {
            exports.insert(SmolStr::new(name));
        }
    }

    /// Returns `prefix` plus the smallest non-negative integer that
    /// makes an unused name anywhere up the stack.
    pub fn fresh(&self, prefix: &str) -> String {
        let mut buffer = itoa::Buffer::new();
        let mut index = 0usize;
        loop {
            let name = format!("{}{}", prefix, buffer.format(index));
            if !self.is_solid_defined(&name) {
                return name;
            }
            index += 1;
        }
    }
}

impl Default for ScopeStack {
    fn default() -> ScopeStack {
        ScopeStack::new()
    }
}
