// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The runtime.
//!
//! [`Runtime`] ties the class registry, per-instance state, the distributor,
//! the render scheduler, and the child-watch table together behind one
//! handle. The embedder forwards host callbacks (connection, attribute and
//! child-list mutations) into it and drives deferred work with
//! [`Runtime::advance_to`] from its event loop; the runtime drives the
//! collaborators back.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use bracken_property::{
    ClassDeclaration, ClassId, ClassRegistry, DefineOutcome, DescriptorError,
    ErasedValue, NodeKey, PropertySpec, SetOutcome, StateError, StateStore, Value, ValueKind,
    attribute_to_property, property_to_attribute,
};
use bracken_scheduler::{InvalidationReason, RenderPhase, RenderScheduler};
use bracken_slots::{
    ChildSource, ChildWatchTable, DistributionPass, DistributionTrace, Distributor,
    IncompatibleChild, IndividualAssignment, NullTrace,
};

use crate::collab::{Collaborators, HostAdapter, RuntimeConfig};
use crate::component::{ComponentBehavior, HookContext, RenderError};

/// An error from a runtime operation.
#[derive(Debug)]
pub enum RuntimeError {
    /// The tag has no registered class; `define` has not run for it.
    UnknownTag {
        /// The unregistered tag.
        tag: String,
    },
    /// The node has no connected instance.
    UnknownNode {
        /// The unconnected node.
        node: NodeKey,
    },
    /// Descriptor construction failed.
    Descriptor(DescriptorError),
    /// A property assignment was rejected.
    State(StateError),
    /// Slot distribution rejected a child.
    Distribution(IncompatibleChild<NodeKey>),
    /// A renderer or lifecycle hook failed.
    Render(RenderError),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTag { tag } => write!(f, "tag `{tag}` is not defined"),
            Self::UnknownNode { node } => write!(f, "node {node:?} has no connected instance"),
            Self::Descriptor(err) => write!(f, "{err}"),
            Self::State(err) => write!(f, "{err}"),
            Self::Distribution(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "{err}"),
        }
    }
}

impl core::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Descriptor(err) => Some(err),
            Self::State(err) => Some(err),
            Self::Distribution(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::UnknownTag { .. } | Self::UnknownNode { .. } => None,
        }
    }
}

impl From<DescriptorError> for RuntimeError {
    fn from(err: DescriptorError) -> Self {
        Self::Descriptor(err)
    }
}

impl From<StateError> for RuntimeError {
    fn from(err: StateError) -> Self {
        Self::State(err)
    }
}

impl From<IncompatibleChild<NodeKey>> for RuntimeError {
    fn from(err: IncompatibleChild<NodeKey>) -> Self {
        Self::Distribution(err)
    }
}

impl From<RenderError> for RuntimeError {
    fn from(err: RenderError) -> Self {
        Self::Render(err)
    }
}

type BehaviorFactory = Box<dyn Fn() -> Box<dyn ComponentBehavior>>;
type ReadyCallback = Box<dyn FnOnce(NodeKey)>;

struct Instance {
    class: ClassId,
    /// Per-class 1-based serial, for stable generated ids.
    serial: u32,
    state: StateStore,
    behavior: Box<dyn ComponentBehavior>,
    /// In-flight distribution, waiting on definitions.
    pass: Option<DistributionPass<NodeKey>>,
    /// Sub-slot assignments written to the host after each render.
    individual: Vec<IndividualAssignment<NodeKey>>,
    ready: bool,
    ready_callbacks: Vec<ReadyCallback>,
    focus_pending: bool,
    has_static: bool,
}

/// Answers a distribution pass's child queries: the host, except that tags
/// this runtime has defined count as defined.
struct DefinitionSource<'a> {
    host: &'a dyn HostAdapter,
    registry: &'a ClassRegistry,
}

impl ChildSource<NodeKey> for DefinitionSource<'_> {
    fn slot_attribute(&self, child: NodeKey) -> Option<String> {
        self.host.slot_attribute(child)
    }

    fn is_text(&self, child: NodeKey) -> bool {
        self.host.is_text(child)
    }

    fn tag_name(&self, child: NodeKey) -> Option<String> {
        self.host.tag_name(child)
    }

    fn is_defined(&self, tag: &str) -> bool {
        self.registry.is_tag_defined(tag) || self.host.is_defined(tag)
    }

    fn is_component(&self, child: NodeKey) -> bool {
        self.host.is_component(child)
    }

    fn accepts(&self, child: NodeKey, accepted: &'static str) -> bool {
        self.host.accepts(child, accepted)
    }
}

/// The component runtime.
///
/// One `Runtime` serves one host document. Classes are declared and defined
/// up front; nodes connect and disconnect as the host tree changes; the
/// embedder calls [`advance_to`](Self::advance_to) whenever its event loop
/// turns, passing a monotonic clock in milliseconds.
pub struct Runtime {
    registry: ClassRegistry,
    config: RuntimeConfig,
    distributor: Distributor,
    scheduler: RenderScheduler<NodeKey>,
    watches: ChildWatchTable<NodeKey>,
    factories: HashMap<String, BehaviorFactory>,
    instances: HashMap<NodeKey, Instance>,
    trace: Box<dyn DistributionTrace<NodeKey>>,
}

impl Runtime {
    /// Creates a runtime with the default distribution timeout.
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_distributor(config, Distributor::new())
    }

    /// Creates a runtime with a custom [`Distributor`].
    #[must_use]
    pub fn with_distributor(config: RuntimeConfig, distributor: Distributor) -> Self {
        Self {
            registry: ClassRegistry::new(),
            config,
            distributor,
            scheduler: RenderScheduler::new(),
            watches: ChildWatchTable::new(),
            factories: HashMap::new(),
            instances: HashMap::new(),
            trace: Box::new(NullTrace),
        }
    }

    /// Replaces the distribution trace sink.
    pub fn set_trace(&mut self, trace: Box<dyn DistributionTrace<NodeKey>>) {
        self.trace = trace;
    }

    /// The runtime-wide configuration.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The class registry, for descriptor and tag queries.
    #[must_use]
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Declares a component class.
    pub fn declare(
        &mut self,
        declaration: ClassDeclaration,
    ) -> Result<ClassId, DescriptorError> {
        self.registry.declare(declaration)
    }

    /// Registers `class` under `tag` with a behavior factory, validating the
    /// class's merged descriptor.
    ///
    /// Idempotent process-wide: repeated registration of the same class is a
    /// no-op, as is a different class under a taken tag; the outcome says
    /// which. The factory is called once per connecting instance.
    pub fn define<F>(
        &mut self,
        tag: &str,
        class: ClassId,
        factory: F,
    ) -> Result<DefineOutcome, DescriptorError>
    where
        F: Fn() -> Box<dyn ComponentBehavior> + 'static,
    {
        // Construction-time descriptor errors surface here, not at first
        // connection.
        self.registry.descriptor(class)?;
        let outcome = self.registry.define_tag(tag, class);
        if outcome == DefineOutcome::Defined {
            self.factories.insert(tag.to_string(), Box::new(factory));
        }
        Ok(outcome)
    }

    /// Connects a node as an instance of the class defined for `tag`.
    ///
    /// Starts child observation and the initial distribution pass. If no
    /// child is waiting on a definition, the instance renders immediately,
    /// resolves its ready signal, and gets its `entered` hook; otherwise
    /// that happens from [`advance_to`](Self::advance_to) once the waits
    /// resolve.
    pub fn connect(
        &mut self,
        node: NodeKey,
        tag: &str,
        collab: &mut Collaborators<'_>,
        now: u64,
    ) -> Result<(), RuntimeError> {
        let class = self
            .registry
            .tag_class(tag)
            .ok_or_else(|| RuntimeError::UnknownTag {
                tag: tag.to_string(),
            })?;
        let factory = self
            .factories
            .get(tag)
            .ok_or_else(|| RuntimeError::UnknownTag {
                tag: tag.to_string(),
            })?;
        let behavior = factory();
        let state = self.registry.new_instance_state(class)?;
        let serial = self.registry.next_instance_serial(class);

        self.scheduler.register(node);
        collab.host.observe_children(node);

        let children = collab.host.children(node);
        let descriptor = self
            .registry
            .built_descriptor(class)
            .expect("descriptor built at define");
        let source = DefinitionSource {
            host: &*collab.host,
            registry: &self.registry,
        };
        let pass = self
            .distributor
            .begin(&children, descriptor, &source, now, &mut *self.trace);

        self.instances.insert(
            node,
            Instance {
                class,
                serial,
                state,
                behavior,
                pass: Some(pass),
                individual: Vec::new(),
                ready: false,
                ready_callbacks: Vec::new(),
                focus_pending: false,
                has_static: false,
            },
        );

        self.try_complete_pass(node, collab)
    }

    /// Disconnects a node: stops observation, detaches its watches in both
    /// directions, drops any pending render, and fires `exited`.
    pub fn disconnect(
        &mut self,
        node: NodeKey,
        collab: &mut Collaborators<'_>,
    ) -> Result<(), RuntimeError> {
        let Some(mut instance) = self.instances.remove(&node) else {
            return Err(RuntimeError::UnknownNode { node });
        };
        collab.host.unobserve_children(node);
        self.scheduler.unregister(node);
        self.watches.detach_all(node);
        if instance.has_static {
            collab.static_area.remove(node);
        }
        instance.behavior.exited();
        Ok(())
    }

    /// Sets a declared property through the accessor path.
    ///
    /// On a value change this reflects the attribute form on the host node
    /// (boolean true writes an empty attribute, false removes it),
    /// invalidates the instance tagged with the property, and routes the
    /// change to a watching slot parent, if any.
    pub fn set_property(
        &mut self,
        node: NodeKey,
        name: &str,
        value: Value,
        collab: &mut Collaborators<'_>,
    ) -> Result<SetOutcome, RuntimeError> {
        let Some(instance) = self.instances.get_mut(&node) else {
            return Err(RuntimeError::UnknownNode { node });
        };
        let descriptor = self
            .registry
            .built_descriptor(instance.class)
            .expect("descriptor built at define");

        let outcome = instance.state.set(descriptor, name, value)?;
        if let SetOutcome::Changed { name } = outcome {
            let attribute = property_to_attribute(name);
            match instance.state.get(name).expect("store is seeded") {
                Value::Bool(true) => collab.host.set_attribute(node, &attribute, ""),
                Value::Bool(false) => collab.host.remove_attribute(node, &attribute),
                Value::Text(text) => {
                    let text = text.clone();
                    collab.host.set_attribute(node, &attribute, &text);
                }
                Value::Int(int) => {
                    collab.host.set_attribute(node, &attribute, &int.to_string());
                }
                // Structured values have no attribute form.
                _ => {}
            }

            self.scheduler
                .invalidate(node, InvalidationReason::Property { name });
            if let Some(parent) = self.watches.on_child_change(node, name) {
                self.scheduler.invalidate(parent, InvalidationReason::Child);
            }
        }
        Ok(outcome)
    }

    /// Reads a property or slot value.
    pub fn get_property(&self, node: NodeKey, name: &str) -> Result<&Value, RuntimeError> {
        let instance = self
            .instances
            .get(&node)
            .ok_or(RuntimeError::UnknownNode { node })?;
        instance.state.get(name).ok_or_else(|| {
            StateError::UnknownProperty {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Applies a host attribute mutation.
    ///
    /// The name is mapped (`ui5-` prefix stripped, kebab to camel); boolean
    /// properties read presence as true and absence as false. Attributes
    /// that map to no declared property are ignored.
    pub fn attribute_changed(
        &mut self,
        node: NodeKey,
        attribute: &str,
        value: Option<&str>,
        collab: &mut Collaborators<'_>,
    ) -> Result<SetOutcome, RuntimeError> {
        let Some(property) = attribute_to_property(attribute) else {
            return Ok(SetOutcome::Unchanged);
        };
        let instance = self
            .instances
            .get(&node)
            .ok_or(RuntimeError::UnknownNode { node })?;
        let descriptor = self
            .registry
            .built_descriptor(instance.class)
            .expect("descriptor built at define");
        let Some(kind) = descriptor.property(&property).map(PropertySpec::kind) else {
            return Ok(SetOutcome::Unchanged);
        };

        let value = match kind {
            ValueKind::Boolean => Value::Bool(value.is_some()),
            _ => match value {
                Some(text) => Value::from(text),
                None => return Ok(SetOutcome::Unchanged),
            },
        };
        self.set_property(node, &property, value, collab)
    }

    /// Applies a host child-list mutation: tears down the previous
    /// distribution's watches and starts a fresh pass.
    pub fn children_changed(
        &mut self,
        node: NodeKey,
        collab: &mut Collaborators<'_>,
        now: u64,
    ) -> Result<(), RuntimeError> {
        let Some(instance) = self.instances.get_mut(&node) else {
            return Err(RuntimeError::UnknownNode { node });
        };
        let descriptor = self
            .registry
            .built_descriptor(instance.class)
            .expect("descriptor built at define");

        for spec in descriptor.slots() {
            if spec.listened().is_some() {
                self.watches.detach_parent_slot(node, spec.name());
            }
        }

        let children = collab.host.children(node);
        let source = DefinitionSource {
            host: &*collab.host,
            registry: &self.registry,
        };
        instance.pass = Some(self.distributor.begin(
            &children,
            descriptor,
            &source,
            now,
            &mut *self.trace,
        ));

        self.try_complete_pass(node, collab)
    }

    /// Advances the cooperative clock: polls in-flight distribution passes
    /// (definitions arrived, deadlines passed), commits completed ones, and
    /// drains the render queue.
    pub fn advance_to(
        &mut self,
        now: u64,
        collab: &mut Collaborators<'_>,
    ) -> Result<(), RuntimeError> {
        let waiting: Vec<NodeKey> = self
            .instances
            .iter()
            .filter(|(_, instance)| instance.pass.is_some())
            .map(|(&node, _)| node)
            .collect();
        for node in waiting {
            if let Some(instance) = self.instances.get_mut(&node)
                && let Some(pass) = &mut instance.pass
            {
                let source = DefinitionSource {
                    host: &*collab.host,
                    registry: &self.registry,
                };
                pass.poll(&source, now, &mut *self.trace);
            }
            self.try_complete_pass(node, collab)?;
        }

        while let Some((node, _reason)) = self.scheduler.take_next() {
            self.render_node(node, collab)?;
        }
        Ok(())
    }

    /// Fires a component event: the `ui5-`-prefixed legacy form first, then
    /// (unless configured off) the canonical form. Both are dispatched even
    /// if the first is cancelled; the result is `false` if either was.
    ///
    /// Event names need not be declared on the class; declaration is
    /// documentation.
    pub fn fire_event(
        &mut self,
        node: NodeKey,
        name: &str,
        data: Option<&ErasedValue>,
        cancelable: bool,
        collab: &mut Collaborators<'_>,
    ) -> Result<bool, RuntimeError> {
        if !self.instances.contains_key(&node) {
            return Err(RuntimeError::UnknownNode { node });
        }
        let legacy = format!("ui5-{name}");
        let mut not_cancelled = collab.events.dispatch(node, &legacy, data, cancelable);
        if !self.config.skip_canonical_events {
            not_cancelled &= collab.events.dispatch(node, name, data, cancelable);
        }
        Ok(not_cancelled)
    }

    /// The node's render target, once the instance is ready.
    #[must_use]
    pub fn dom_ref(&self, node: NodeKey) -> Option<NodeKey> {
        self.instances
            .get(&node)
            .filter(|instance| instance.ready)
            .map(|_| node)
    }

    /// The node to move focus to, once the instance is ready.
    #[must_use]
    pub fn focus_dom_ref(&self, node: NodeKey) -> Option<NodeKey> {
        self.dom_ref(node)
    }

    /// Focuses the node, deferring until the instance is ready if needed.
    pub fn focus(
        &mut self,
        node: NodeKey,
        collab: &mut Collaborators<'_>,
    ) -> Result<(), RuntimeError> {
        let Some(instance) = self.instances.get_mut(&node) else {
            return Err(RuntimeError::UnknownNode { node });
        };
        if instance.ready {
            collab.host.focus(node);
        } else {
            instance.focus_pending = true;
        }
        Ok(())
    }

    /// Whether the instance has completed its first render.
    #[must_use]
    pub fn is_ready(&self, node: NodeKey) -> bool {
        self.instances
            .get(&node)
            .is_some_and(|instance| instance.ready)
    }

    /// Registers a one-shot callback for the instance's ready signal. Fires
    /// immediately if the instance is already ready.
    pub fn on_ready<F>(&mut self, node: NodeKey, callback: F) -> Result<(), RuntimeError>
    where
        F: FnOnce(NodeKey) + 'static,
    {
        let Some(instance) = self.instances.get_mut(&node) else {
            return Err(RuntimeError::UnknownNode { node });
        };
        if instance.ready {
            callback(node);
        } else {
            instance.ready_callbacks.push(Box::new(callback));
        }
        Ok(())
    }

    /// The instance's per-class 1-based serial, for stable generated ids.
    #[must_use]
    pub fn instance_serial(&self, node: NodeKey) -> Option<u32> {
        self.instances.get(&node).map(|instance| instance.serial)
    }

    /// The instance's class.
    #[must_use]
    pub fn instance_class(&self, node: NodeKey) -> Option<ClassId> {
        self.instances.get(&node).map(|instance| instance.class)
    }

    /// The instance's render phase.
    #[must_use]
    pub fn render_phase(&self, node: NodeKey) -> Option<RenderPhase> {
        self.scheduler.phase(node)
    }

    /// Whether any renders are queued.
    #[must_use]
    pub fn has_pending_renders(&self) -> bool {
        self.scheduler.has_pending()
    }

    /// Commits a completed distribution pass: state writes, watch
    /// attachment, and either the immediate first render or a single
    /// slots invalidation.
    fn try_complete_pass(
        &mut self,
        node: NodeKey,
        collab: &mut Collaborators<'_>,
    ) -> Result<(), RuntimeError> {
        let first_render;
        {
            let Some(instance) = self.instances.get_mut(&node) else {
                return Ok(());
            };
            if !instance.pass.as_ref().is_some_and(DistributionPass::is_complete) {
                return Ok(());
            }
            let pass = instance.pass.take().expect("checked above");
            let descriptor = self
                .registry
                .built_descriptor(instance.class)
                .expect("descriptor built at define");
            let source = DefinitionSource {
                host: &*collab.host,
                registry: &self.registry,
            };
            let result = pass.commit(descriptor, &source)?;

            let mut changed = false;
            for (property, children) in result.groups {
                changed |= instance.state.set_slot_children(property, children);
            }
            for request in result.watches {
                self.watches
                    .attach(request.child, node, request.slot, request.filter);
            }
            instance.individual = result.individual;

            first_render = !instance.ready;
            if !first_render && changed {
                self.scheduler.invalidate(node, InvalidationReason::Slots);
            }
        }

        if first_render {
            self.render_node(node, collab)?;
            self.finish_ready(node, collab);
        }
        Ok(())
    }

    /// One render, in hook order. An error propagates to the caller and
    /// leaves the instance mid-render.
    fn render_node(
        &mut self,
        node: NodeKey,
        collab: &mut Collaborators<'_>,
    ) -> Result<(), RuntimeError> {
        let Some(instance) = self.instances.get_mut(&node) else {
            // Disconnected while queued.
            return Ok(());
        };
        let descriptor = self
            .registry
            .built_descriptor(instance.class)
            .expect("descriptor built at define");

        {
            let mut ctx = HookContext::new(descriptor, &mut instance.state);
            instance.behavior.before_render(&mut ctx)?;
            instance.behavior.finalize_render(&mut ctx)?;
        }
        self.scheduler.resume_invalidation(node);

        let output = instance.behavior.build_output(&instance.state);
        let style = collab.style.effective_style(instance.class);
        collab.renderer.render(&output, node, style.as_deref());

        match instance.behavior.build_static_output(&instance.state) {
            Some(static_output) => {
                collab.static_area.update(node, &static_output);
                instance.has_static = true;
            }
            None => {
                if instance.has_static {
                    collab.static_area.remove(node);
                    instance.has_static = false;
                }
            }
        }

        // Sub-slot attributes go in after the render target's slot elements
        // exist.
        for assignment in &instance.individual {
            let value = format!("{}-{}", assignment.slot, assignment.index);
            collab.host.set_slot_attribute(assignment.child, &value);
        }

        instance.behavior.after_render(&instance.state)?;
        self.scheduler.finish_render(node);
        Ok(())
    }

    /// Resolves the one-shot ready signal after the first render.
    fn finish_ready(&mut self, node: NodeKey, collab: &mut Collaborators<'_>) {
        let Some(instance) = self.instances.get_mut(&node) else {
            return;
        };
        instance.ready = true;
        let callbacks = core::mem::take(&mut instance.ready_callbacks);
        let focus_pending = core::mem::take(&mut instance.focus_pending);
        instance.behavior.entered();

        for callback in callbacks {
            callback(node);
        }
        if focus_pending {
            collab.host.focus(node);
        }
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("instances", &self.instances.len())
            .field("pending_renders", &self.scheduler.pending_len())
            .finish_non_exhaustive()
    }
}
