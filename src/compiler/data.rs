use crate::compiler::context::Scope;
use crate::compiler::core::Translation;
use crate::dsl::{Activity, AssignTime, DataObject};
use crate::net::{query, DecompositionIndex, NodeIndex, Variable, VariableMapping};
use tracing::{debug, warn};

/// Variables gathered while mapping one activity, declared once its
/// decomposition is known.
#[derive(Debug, Default)]
pub struct TaskVariables {
    pub local: Vec<Variable>,
    pub input: Vec<Variable>,
    pub output: Vec<Variable>,
}

impl TaskVariables {
    fn find(&self, name: &str) -> Option<&Variable> {
        self.local
            .iter()
            .chain(&self.input)
            .chain(&self.output)
            .find(|v| v.name.eq_ignore_ascii_case(name))
    }
}

fn push_unique(variables: &mut Vec<Variable>, variable: Variable) {
    if !variables.iter().any(|v| v.name.eq_ignore_ascii_case(&variable.name)) {
        variables.push(variable);
    }
}

pub fn property_type(declared: Option<&str>) -> String {
    match declared.map(str::trim) {
        Some(ty) if !ty.is_empty() && !ty.eq_ignore_ascii_case("null") => ty.to_lowercase(),
        _ => "string".to_string(),
    }
}

impl<'a> Translation<'a> {
    /// Declares each data object touching this decomposition as a local
    /// variable, read into the tasks it feeds on start and written back from the
    /// tasks feeding it on completion.
    pub(crate) fn bind_data_objects(&mut self, scope: &Scope<'a>) {
        let dec = scope.decomposition;
        for object in &self.graph.diagram().data_objects {
            if object.feeds.is_empty() && object.fed_by.is_empty() {
                continue;
            }
            let readers: Vec<NodeIndex> = object.feeds.iter().filter_map(|id| scope.get(id)).collect();
            let writers: Vec<NodeIndex> = object.fed_by.iter().filter_map(|id| scope.get(id)).collect();
            if readers.is_empty() && writers.is_empty() {
                continue;
            }
            self.bind_data_object(dec, object, &readers, &writers);
        }
    }

    fn bind_data_object(&mut self, dec: DecompositionIndex, object: &DataObject, readers: &[NodeIndex], writers: &[NodeIndex]) {
        let decomposition = self.net.decomposition_mut(dec);
        if decomposition.has_variable(&object.label) {
            debug!(object = %object.id, variable = %object.label, "Variable already declared, data object skipped");
            return;
        }
        let variable = Variable::new(&object.label, &object.data_type).with_initial_value(object.value.clone());
        decomposition.add_local_variable(variable.clone());
        let scope_id = decomposition.id.clone();

        for &reader in readers {
            let Some(t) = self.net.decomposition_mut(dec).task_mut(reader) else {
                warn!(object = %object.id, "Data object feeds a condition, association ignored");
                continue;
            };
            t.add_starting_mapping(VariableMapping::new(query::read_variable(&scope_id, &variable.name), &variable.name));
            if let Some(sub) = t.decomposes_to {
                self.net.decomposition_mut(sub).add_input_param(variable.clone());
            }
        }

        for &writer in writers {
            let Some(t) = self.net.decomposition_mut(dec).task_mut(writer) else {
                warn!(object = %object.id, "Data object fed by a condition, association ignored");
                continue;
            };
            let query = query::read_variable(&t.id, &variable.name);
            t.add_completed_mapping(VariableMapping::new(query, &variable.name));
            if let Some(sub) = t.decomposes_to {
                self.net.decomposition_mut(sub).add_output_param(variable.clone());
            }
        }
    }

    pub(crate) fn bind_properties(&mut self, dec: DecompositionIndex, task: NodeIndex, activity: &Activity, variables: &mut TaskVariables) {
        let decomposition = self.net.decomposition_mut(dec);
        let scope_id = decomposition.id.clone();
        let Some(t) = decomposition.task_mut(task) else {
            return;
        };
        for property in &activity.properties {
            let variable = Variable::new(&property.name, &property_type(property.ty.as_deref()))
                .with_initial_value(property.value.clone());
            t.add_starting_mapping(VariableMapping::new(query::read_variable(&scope_id, &variable.name), &variable.name));
            t.add_completed_mapping(VariableMapping::new(query::read_variable(&t.id, &variable.name), &variable.name));
            push_unique(&mut variables.local, variable);
        }
    }

    /// Start assignments read the variable in from the enclosing net, end
    /// assignments write it back. A variable already known to the task or the
    /// enclosing net is reused.
    pub(crate) fn bind_assignments(&mut self, dec: DecompositionIndex, task: NodeIndex, activity: &Activity, variables: &mut TaskVariables) {
        let decomposition = self.net.decomposition_mut(dec);
        let scope_id = decomposition.id.clone();
        for assignment in &activity.assignments {
            let variable = match variables.find(&assignment.to) {
                Some(known) => known.clone(),
                None => {
                    let variable = decomposition
                        .local_variables
                        .iter()
                        .find(|v| v.name.eq_ignore_ascii_case(&assignment.to))
                        .map(|v| Variable::new(&v.name, &v.data_type))
                        .unwrap_or_else(|| Variable::new(&assignment.to, "string"));
                    push_unique(&mut variables.local, variable.clone());
                    variable
                }
            };

            let Some(t) = decomposition.task_mut(task) else {
                return;
            };
            match assignment.assign_time {
                AssignTime::Start => {
                    t.add_starting_mapping(VariableMapping::new(query::read_variable(&scope_id, &variable.name), &variable.name));
                    push_unique(&mut variables.input, variable);
                }
                AssignTime::End => {
                    let query = query::read_variable(&t.id, &variable.name);
                    t.add_completed_mapping(VariableMapping::new(query, &variable.name));
                    push_unique(&mut variables.output, variable);
                }
            }
        }
    }

    pub(crate) fn declare_task_variables(&mut self, dec: DecompositionIndex, task_dec: DecompositionIndex, variables: TaskVariables) {
        let enclosing = self.net.decomposition_mut(dec);
        for variable in &variables.local {
            enclosing.add_local_variable(variable.clone());
        }

        let own = self.net.decomposition_mut(task_dec);
        for variable in variables.local {
            own.add_input_param(variable.clone());
            own.add_output_param(variable);
        }
        for variable in variables.input {
            own.add_input_param(variable);
        }
        for variable in variables.output {
            own.add_output_param(variable);
        }
    }
}
