//! Variables of the analyzed function, as reported by the host

use super::constraint::Constraint;
use super::program_state::ProgramState;
use crate::shared::models::VariableId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    /// `var` / `let` / `const`
    Local,
    Function,
    Class,
    Import,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSeed {
    pub variable: VariableId,
    pub rest: bool,
    /// Constraint known to the host (type annotation, JSDoc)
    pub constraint: Option<Constraint>,
}

impl ParameterSeed {
    pub fn new(variable: VariableId) -> Self {
        Self {
            variable,
            rest: false,
            constraint: None,
        }
    }

    pub fn rest(variable: VariableId) -> Self {
        Self {
            rest: true,
            ..Self::new(variable)
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    fn initial_constraint(&self) -> Constraint {
        match self.constraint {
            Some(constraint) => constraint,
            None if self.rest => Constraint::ARRAY,
            None => Constraint::ANY_VALUE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionScope {
    pub variables: Vec<(VariableId, VariableKind)>,
    pub parameters: Vec<ParameterSeed>,
    /// The implicit `arguments` object, when the body uses it
    pub arguments: Option<VariableId>,
}

impl FunctionScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local(mut self, variable: VariableId) -> Self {
        self.variables.push((variable, VariableKind::Local));
        self
    }

    pub fn with_variable(mut self, variable: VariableId, kind: VariableKind) -> Self {
        self.variables.push((variable, kind));
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterSeed) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_arguments(mut self, variable: VariableId) -> Self {
        self.arguments = Some(variable);
        self
    }

    /// Locals start `undefined`, parameters unknown (rest parameters are
    /// arrays), `arguments` truthy. Functions, classes and imports are left
    /// out of the state.
    pub fn initial_state(&self) -> ProgramState {
        let mut state = ProgramState::new();
        for (variable, kind) in &self.variables {
            if *kind == VariableKind::Local {
                state = state.with_constraint(*variable, Constraint::UNDEFINED);
            }
        }
        for parameter in &self.parameters {
            state = state.with_constraint(parameter.variable, parameter.initial_constraint());
        }
        if let Some(arguments) = self.arguments {
            state = state.with_constraint(arguments, Constraint::TRUTHY);
        }
        state
    }
}
