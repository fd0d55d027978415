use crate::compiler::context::{Scope, TranslationContext};
use crate::config::TranslatorOptions;
use crate::dsl::graph::SourceGraph;
use crate::dsl::{Diagram, Node};
use crate::error::TranslateError;
use crate::net::serialize::NetSerializer;
use crate::net::{DecompositionIndex, DecompositionKind, Net, NodeIndex, Resource};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Lane id to the resource its tasks are distributed to.
pub type ResourcingMap = HashMap<String, Resource>;

/// Entry point: turns one pool of a diagram into a workflow net.
pub struct Translator {
    options: TranslatorOptions,
}

impl Translator {
    pub fn new() -> Self {
        Self::with_options(TranslatorOptions::default())
    }

    pub fn with_options(options: TranslatorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }

    pub fn translate(
        &self,
        diagram: &Diagram,
        pool_index: usize,
        resourcing: &ResourcingMap,
    ) -> Result<Net, TranslateError> {
        let pool = diagram.processes.get(pool_index).ok_or(TranslateError::PoolNotFound {
            index: pool_index,
            available: diagram.processes.len(),
        })?;

        let graph = SourceGraph::new(diagram);
        let mut net = Net::new(&format!("{}{}", self.options.model_id_prefix, pool_index));
        net.data_type_definition = diagram.data_type_definition.clone();

        let mut run = Translation {
            graph: &graph,
            options: &self.options,
            resourcing,
            ctx: TranslationContext::new(),
            net,
        };
        run.build_decomposition(&pool.id, &pool.name, &pool.nodes, true, 0)?;

        info!(
            net = %run.net.id,
            decompositions = run.net.decompositions.len(),
            ids = run.ctx.generated_count(),
            "Translation finished"
        );
        Ok(run.net)
    }

    pub fn translate_to_string(
        &self,
        diagram: &Diagram,
        pool_index: usize,
        resourcing: &ResourcingMap,
        serializer: &dyn NetSerializer,
    ) -> anyhow::Result<String> {
        let net = self.translate(diagram, pool_index, resourcing)?;
        serializer.serialize(&net)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

/// One translation run. The rewriting components add their passes to this
/// type from their own modules.
pub(crate) struct Translation<'a> {
    pub(crate) graph: &'a SourceGraph<'a>,
    pub(crate) options: &'a TranslatorOptions,
    pub(crate) resourcing: &'a ResourcingMap,
    pub(crate) ctx: TranslationContext,
    pub(crate) net: Net,
}

impl<'a> Translation<'a> {
    /// Builds the decomposition of a pool or subprocess, recursing into nested
    /// subprocesses before their composite task is finished.
    pub(crate) fn build_decomposition(
        &mut self,
        container_id: &str,
        label: &str,
        nodes: &'a [Node],
        root: bool,
        depth: usize,
    ) -> Result<DecompositionIndex, TranslateError> {
        if depth > self.options.max_nesting_depth {
            return Err(TranslateError::NestingTooDeep {
                id: container_id.to_string(),
                limit: self.options.max_nesting_depth,
            });
        }

        let id = if root {
            self.options.root_net_id.clone()
        } else {
            let name = if label.is_empty() { container_id } else { label };
            self.ctx.generate_id(&name.replace(' ', ""))
        };
        let dec = self.net.create_decomposition(&id, DecompositionKind::Net);
        self.net.decomposition_mut(dec).root = root;
        let mut scope = Scope::new(dec, depth);

        // 1. Pass 1: map nodes, gateways are deferred until their neighbours exist
        let mut gateways = Vec::new();
        let mut with_handlers = Vec::new();
        for node in nodes {
            if node.activity().is_some() && !self.graph.attached_events(&node.id).is_empty() {
                with_handlers.push(node);
            }
            if node.attached_to().is_some() {
                continue;
            }

            match self.map_element(&mut scope, node)? {
                Some(_) => {}
                None if node.is_gateway() => gateways.push(node),
                None => warn!(node = %node.id, "Node has no mapping, its flows are dropped"),
            }
        }

        // 2. Pass 2: gateways
        for gateway in gateways {
            self.fold_gateway(&mut scope, gateway);
        }

        // 3. Input and output condition
        let output = self
            .net
            .decomposition_mut(dec)
            .ensure_output_condition(|| self.ctx.generate_id("Output"), "Output Condition");
        let input = self
            .net
            .decomposition_mut(dec)
            .ensure_input_condition(|| self.ctx.generate_id("Input"), "Input Condition");
        if scope.is_empty() {
            let decomposition = self.net.decomposition_mut(dec);
            if !decomposition.has_edge(input, output) {
                decomposition.create_edge(input, output, false, "", 1);
            }
        }

        // 4. Data, edges, exceptions, loops
        self.bind_data_objects(&scope);
        let terminates = self.link(&scope);
        for host in with_handlers {
            self.compile_exceptions(&mut scope, host);
        }
        self.rewrite_loops(&scope);
        for terminate in terminates {
            self.close_cancellation_set(dec, terminate);
        }

        let decomposition = self.net.decomposition(dec);
        info!(
            decomposition = %decomposition.id,
            nodes = decomposition.nodes.len(),
            edges = decomposition.edges.len(),
            "Decomposition built"
        );
        Ok(dec)
    }

    /// A terminating task cancels every other node of its decomposition.
    pub(crate) fn close_cancellation_set(&mut self, dec: DecompositionIndex, terminate: NodeIndex) {
        let decomposition = self.net.decomposition_mut(dec);
        for member in 0..decomposition.nodes.len() {
            decomposition.cancel_on(terminate, member);
        }
        debug!(
            task = %decomposition.node_id(terminate),
            size = decomposition.task(terminate).map(|t| t.cancellation_set.len()).unwrap_or(0),
            "Cancellation set closed"
        );
    }

    pub(crate) fn ensure_task_decomposition(&mut self, dec: DecompositionIndex, task: NodeIndex) -> Option<DecompositionIndex> {
        let (task_id, existing) = {
            let t = self.net.decomposition(dec).task(task)?;
            (t.id.clone(), t.decomposes_to)
        };
        if existing.is_some() {
            return existing;
        }

        let sub = self.net.create_decomposition(&task_id, DecompositionKind::WebServiceGateway);
        if let Some(t) = self.net.decomposition_mut(dec).task_mut(task) {
            t.decomposes_to = Some(sub);
        }
        Some(sub)
    }

    pub(crate) fn synthesize_task(&mut self, dec: DecompositionIndex, name: &str) -> NodeIndex {
        let id = self.ctx.generate_gateway_id();
        self.net.decomposition_mut(dec).create_task(id, name)
    }
}
