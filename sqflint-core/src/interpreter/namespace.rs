use fnv::FnvHashMap;

use crate::types::Value;

/// Variables visible at one nesting level. Names are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    level: usize,
    values: FnvHashMap<String, Value>,
}

impl Scope {
    pub fn new(level: usize) -> Self {
        Self {
            level,
            values: FnvHashMap::default(),
        }
    }

    /// Depth of the scope in its namespace, 0 being the global scope.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&name.to_lowercase())
    }

    /// Value of `name`, `Nothing` when it was never set.
    pub fn get(&self, name: &str) -> Value {
        self.values
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or(Value::Nothing)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_lowercase(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Stack of scopes. The bottom scope holds the global variables of the
/// namespace and is never popped.
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    name: String,
    stack: Vec<Scope>,
}

impl Namespace {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            stack: vec![Scope::new(0)],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn base_scope(&self) -> &Scope {
        &self.stack[0]
    }

    pub fn current_scope(&self) -> &Scope {
        &self.stack[self.stack.len() - 1]
    }

    /// Index of the scope `name` resolves to. Local names (starting with
    /// `_`) are searched from the innermost scope down to the first
    /// non-global one and fall back to the global scope. Other names always
    /// resolve to the global scope.
    fn scope_index(&self, name: &str) -> usize {
        if name.starts_with('_') {
            let lower = name.to_lowercase();
            for n in (1..self.stack.len()).rev() {
                if self.stack[n].values.contains_key(&lower) {
                    return n;
                }
            }
        }
        0
    }

    pub fn get_scope(&self, name: &str) -> &Scope {
        &self.stack[self.scope_index(name)]
    }

    pub fn get_scope_mut(&mut self, name: &str) -> &mut Scope {
        let index = self.scope_index(name);
        &mut self.stack[index]
    }

    /// Pushes a scope holding `values`.
    pub fn add_scope(&mut self, values: Vec<(String, Value)>) {
        let mut scope = Scope::new(self.stack.len());
        for (name, value) in values {
            scope.set(&name, value);
        }
        self.stack.push(scope);
    }

    /// Pops the innermost scope. The global scope stays.
    pub fn del_scope(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub(crate) fn current_scope_mut(&mut self) -> &mut Scope {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_names_search_the_stack() {
        let mut namespace = Namespace::new("missionNamespace");
        namespace.add_scope(vec![("_a".to_string(), Value::number(1.0))]);
        namespace.add_scope(vec![]);
        assert_eq!(1, namespace.get_scope("_A").level());
        assert_eq!(Value::number(1.0), namespace.get_scope("_a").get("_A"));
        // unknown locals fall back to the global scope
        assert_eq!(0, namespace.get_scope("_b").level());
        assert_eq!(Value::Nothing, namespace.get_scope("_b").get("_b"));
    }

    #[test]
    fn global_names_skip_local_scopes() {
        let mut namespace = Namespace::new("uinamespace");
        namespace.add_scope(vec![("a".to_string(), Value::number(1.0))]);
        assert_eq!(0, namespace.get_scope("a").level());
        namespace.get_scope_mut("a").set("A", Value::Boolean(None));
        assert_eq!(Value::Boolean(None), namespace.base_scope().get("a"));
    }

    #[test]
    fn global_scope_is_never_popped() {
        let mut namespace = Namespace::new("profilenamespace");
        namespace.add_scope(vec![]);
        assert_eq!(2, namespace.depth());
        namespace.del_scope();
        namespace.del_scope();
        assert_eq!(1, namespace.depth());
        assert_eq!(0, namespace.current_scope().level());
    }
}
