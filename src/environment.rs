use crate::ast::Value;
use crate::error::RuntimeError;
use crate::shared_list::SharedList;
use crate::token::Token;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Environment {
    values: SharedList<BTreeMap<String, Value>>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment {
            values: SharedList::new().with(BTreeMap::new()),
        }
    }
    pub fn new_child(&self) -> Environment {
        Environment {
            values: self.values.with(BTreeMap::new()),
        }
    }
    pub fn depth(&self) -> usize {
        self.values.len()
    }
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(mut scope) = self.values.peek_mut() {
            scope.insert(name.to_string(), value);
        }
    }
    pub fn get(&self, token: &Token) -> Result<Value, RuntimeError> {
        self.values
            .find_map(|scope| scope.get(token.lexeme).cloned())
            .ok_or_else(|| undefined(token))
    }
    // Never creates a binding.
    pub fn assign(&mut self, token: &Token, value: Value) -> Result<(), RuntimeError> {
        self.values
            .find_map_mut(|scope| {
                scope
                    .get_mut(token.lexeme)
                    .map(|slot| *slot = value.clone())
            })
            .ok_or_else(|| undefined(token))
    }
}

fn undefined(token: &Token) -> RuntimeError {
    RuntimeError::new(
        token,
        format!("Undefined variable '{}'.", token.lexeme).as_str(),
    )
}
