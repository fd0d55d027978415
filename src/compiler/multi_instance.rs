use crate::compiler::core::Translation;
use crate::dsl::MiCompletion;
use crate::net::{
    query, CreationMode, DecompositionIndex, MiDataInput, MiDataOutput, MultiInstanceParam, NodeIndex,
    Variable,
};
use tracing::debug;

/// Maximum instance count, standing for "unbounded".
pub const UNBOUNDED: u32 = i32::MAX as u32;

pub fn threshold_for(completion: MiCompletion) -> Option<u32> {
    match completion {
        MiCompletion::One => Some(1),
        MiCompletion::All | MiCompletion::Complex => Some(UNBOUNDED),
        MiCompletion::None => None,
    }
}

impl<'a> Translation<'a> {
    /// Gives `task` its multi-instance parameters. Instances are split off and
    /// joined back on a single-space separated `<task-id>_input` variable.
    pub(crate) fn compile_multi_instance(&mut self, dec: DecompositionIndex, task: NodeIndex, completion: MiCompletion) {
        let decomposition = self.net.decomposition_mut(dec);
        let scope_id = decomposition.id.clone();
        let Some(task_id) = decomposition.task(task).map(|t| t.id.clone()) else {
            return;
        };

        let variable = Variable::new(&format!("{}_input", task_id), "string");
        let path = query::element_path(&scope_id, &variable.name);
        decomposition.add_input_param(variable.clone());

        let own = decomposition.task(task).and_then(|t| t.decomposes_to);
        if let Some(t) = decomposition.task_mut(task) {
            t.multi_instance = Some(MultiInstanceParam {
                minimum: 1,
                maximum: UNBOUNDED,
                threshold: threshold_for(completion),
                creation_mode: CreationMode::Static,
                data_input: MiDataInput {
                    expression: path.clone(),
                    splitting_expression: " ".to_string(),
                    formal_input_param: variable.name.clone(),
                },
                data_output: MiDataOutput {
                    formal_output_expression: path,
                    output_joining_expression: " ".to_string(),
                    result_applied_to_local_variable: variable.name.clone(),
                },
            });
        }
        if let Some(own) = own {
            self.net.decomposition_mut(own).add_input_param(variable);
        }
        debug!(task = %task_id, ?completion, "Multi-instance parameters set");
    }
}
