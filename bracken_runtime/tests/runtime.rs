// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tests for the `bracken_runtime` crate.
//!
//! These drive a [`Runtime`] against mock collaborators: a host tree the
//! tests mutate directly, a renderer that records every call with a
//! stringified state snapshot, and recording event/static-area sinks.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use bracken_property::{
    ClassDeclaration, ClassId, DefineOutcome, ErasedValue, ListenFor, NodeKey, PropertySpec,
    SetOutcome, SlotSpec, StateError, StateStore, Value,
};
use bracken_runtime::{
    Collaborators, ComponentBehavior, EventDispatcher, HostAdapter, RenderOutput, Renderer,
    Runtime, RuntimeConfig, RuntimeError, StaticAreaHost, StyleProvider,
};
use bracken_scheduler::RenderPhase;
use bracken_slots::{ChildSource, Distributor};

#[derive(Default)]
struct MockHost {
    children: HashMap<NodeKey, Vec<NodeKey>>,
    attributes: HashMap<(NodeKey, String), String>,
    slot_attrs: HashMap<NodeKey, String>,
    tags: HashMap<NodeKey, String>,
    text: HashSet<NodeKey>,
    defined: HashSet<String>,
    components: HashSet<NodeKey>,
    types: HashMap<NodeKey, &'static str>,
    observed: HashSet<NodeKey>,
    focused: Vec<NodeKey>,
}

impl MockHost {
    fn element(&mut self, node: NodeKey, tag: &str) {
        self.tags.insert(node, tag.to_string());
    }

    fn component(&mut self, node: NodeKey, tag: &str, ty: &'static str) {
        self.element(node, tag);
        self.components.insert(node);
        self.types.insert(node, ty);
    }

    fn attribute(&self, node: NodeKey, name: &str) -> Option<&str> {
        self.attributes
            .get(&(node, name.to_string()))
            .map(String::as_str)
    }
}

impl ChildSource<NodeKey> for MockHost {
    fn slot_attribute(&self, child: NodeKey) -> Option<String> {
        self.slot_attrs.get(&child).cloned()
    }

    fn is_text(&self, child: NodeKey) -> bool {
        self.text.contains(&child)
    }

    fn tag_name(&self, child: NodeKey) -> Option<String> {
        self.tags.get(&child).cloned()
    }

    fn is_defined(&self, tag: &str) -> bool {
        self.defined.contains(tag)
    }

    fn is_component(&self, child: NodeKey) -> bool {
        self.components.contains(&child)
    }

    fn accepts(&self, child: NodeKey, accepted: &'static str) -> bool {
        self.types.get(&child) == Some(&accepted)
    }
}

impl HostAdapter for MockHost {
    fn children(&self, node: NodeKey) -> Vec<NodeKey> {
        self.children.get(&node).cloned().unwrap_or_default()
    }

    fn set_slot_attribute(&mut self, child: NodeKey, value: &str) {
        self.slot_attrs.insert(child, value.to_string());
    }

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) {
        self.attributes
            .insert((node, name.to_string()), value.to_string());
    }

    fn remove_attribute(&mut self, node: NodeKey, name: &str) {
        self.attributes.remove(&(node, name.to_string()));
    }

    fn observe_children(&mut self, node: NodeKey) {
        self.observed.insert(node);
    }

    fn unobserve_children(&mut self, node: NodeKey) {
        self.observed.remove(&node);
    }

    fn focus(&mut self, node: NodeKey) {
        self.focused.push(node);
    }
}

#[derive(Default)]
struct MockRenderer {
    calls: Vec<(NodeKey, String, Option<String>)>,
}

impl Renderer for MockRenderer {
    fn render(&mut self, output: &RenderOutput, target: NodeKey, style: Option<&str>) {
        let payload = output.downcast_ref::<String>().cloned().unwrap_or_default();
        self.calls
            .push((target, payload, style.map(str::to_string)));
    }
}

#[derive(Default)]
struct MockStyles {
    style: Option<String>,
}

impl StyleProvider for MockStyles {
    fn effective_style(&self, _class: ClassId) -> Option<String> {
        self.style.clone()
    }
}

#[derive(Default)]
struct MockEvents {
    log: Vec<(NodeKey, String)>,
    cancel: HashSet<String>,
}

impl EventDispatcher for MockEvents {
    fn dispatch(
        &mut self,
        node: NodeKey,
        event_type: &str,
        _data: Option<&ErasedValue>,
        _cancelable: bool,
    ) -> bool {
        self.log.push((node, event_type.to_string()));
        !self.cancel.contains(event_type)
    }
}

#[derive(Default)]
struct MockStaticArea {
    updates: Vec<NodeKey>,
    removed: Vec<NodeKey>,
}

impl StaticAreaHost for MockStaticArea {
    fn update(&mut self, node: NodeKey, _output: &RenderOutput) {
        self.updates.push(node);
    }

    fn remove(&mut self, node: NodeKey) {
        self.removed.push(node);
    }
}

#[derive(Default)]
struct World {
    host: MockHost,
    renderer: MockRenderer,
    styles: MockStyles,
    events: MockEvents,
    statics: MockStaticArea,
}

impl World {
    fn collab(&mut self) -> Collaborators<'_> {
        Collaborators {
            host: &mut self.host,
            renderer: &mut self.renderer,
            style: &self.styles,
            events: &mut self.events,
            static_area: &mut self.statics,
        }
    }
}

fn snapshot(state: &StateStore) -> String {
    state
        .entries()
        .map(|(name, value)| format!("{name}={value:?}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders a stringified snapshot of the whole state.
#[derive(Default)]
struct Probe {
    entered: Rc<Cell<usize>>,
    exited: Rc<Cell<usize>>,
    with_static: bool,
}

impl ComponentBehavior for Probe {
    fn build_output(&mut self, state: &StateStore) -> RenderOutput {
        RenderOutput::new(snapshot(state))
    }

    fn build_static_output(&mut self, _state: &StateStore) -> Option<RenderOutput> {
        self.with_static
            .then(|| RenderOutput::new("static".to_string()))
    }

    fn entered(&mut self) {
        self.entered.set(self.entered.get() + 1);
    }

    fn exited(&mut self) {
        self.exited.set(self.exited.get() + 1);
    }
}

fn node(raw: u64) -> NodeKey {
    NodeKey::new(raw)
}

fn button_class(rt: &mut Runtime) -> ClassId {
    rt.declare(
        ClassDeclaration::new("Button")
            .property("text", PropertySpec::text(""))
            .property("count", PropertySpec::integer(0))
            .property("disabled", PropertySpec::boolean())
            .property("iconOnly", PropertySpec::boolean())
            .event("click"),
    )
    .unwrap()
}

fn button_runtime() -> Runtime {
    let mut rt = Runtime::new(RuntimeConfig::default());
    let class = button_class(&mut rt);
    rt.define("x-button", class, || Box::<Probe>::default())
        .unwrap();
    rt
}

fn list_runtime(listen: Option<ListenFor>) -> Runtime {
    let mut rt = Runtime::new(RuntimeConfig::default());
    let mut slot = SlotSpec::new("default").property_name("items");
    if let Some(filter) = listen {
        slot = slot.listen_for(filter);
    }
    let list = rt
        .declare(ClassDeclaration::new("List").slot(slot))
        .unwrap();
    rt.define("x-list", list, || Box::<Probe>::default())
        .unwrap();
    rt
}

#[test]
fn connect_renders_immediately_and_signals_ready() {
    let mut world = World::default();
    let mut rt = Runtime::new(RuntimeConfig::default());
    let class = button_class(&mut rt);
    let entered = Rc::new(Cell::new(0));
    let probe_entered = entered.clone();
    rt.define("x-button", class, move || {
        Box::new(Probe {
            entered: probe_entered.clone(),
            ..Probe::default()
        })
    })
    .unwrap();

    let btn = node(1);
    world.host.element(btn, "x-button");
    rt.connect(btn, "x-button", &mut world.collab(), 0).unwrap();

    assert!(rt.is_ready(btn));
    assert_eq!(entered.get(), 1);
    assert_eq!(world.renderer.calls.len(), 1);
    assert!(world.host.observed.contains(&btn));
    assert_eq!(rt.render_phase(btn), Some(RenderPhase::Clean));
    assert_eq!(rt.instance_serial(btn), Some(1));
}

#[test]
fn batched_writes_render_once_with_final_values() {
    let mut world = World::default();
    let mut rt = button_runtime();
    let btn = node(1);
    world.host.element(btn, "x-button");
    rt.connect(btn, "x-button", &mut world.collab(), 0).unwrap();
    assert_eq!(world.renderer.calls.len(), 1);

    rt.set_property(btn, "text", Value::from("a"), &mut world.collab())
        .unwrap();
    rt.set_property(btn, "text", Value::from("b"), &mut world.collab())
        .unwrap();
    rt.set_property(btn, "count", Value::from(5_i64), &mut world.collab())
        .unwrap();
    assert!(rt.has_pending_renders());

    rt.advance_to(10, &mut world.collab()).unwrap();

    // Three writes, one render, against the final state.
    assert_eq!(world.renderer.calls.len(), 2);
    let (_, payload, _) = world.renderer.calls.last().unwrap();
    assert!(payload.contains("text=Text(\"b\")"));
    assert!(payload.contains("count=Int(5)"));
    assert!(!rt.has_pending_renders());
}

#[test]
fn equal_value_set_is_a_complete_no_op() {
    let mut world = World::default();
    let mut rt = button_runtime();
    let btn = node(1);
    world.host.element(btn, "x-button");
    rt.connect(btn, "x-button", &mut world.collab(), 0).unwrap();

    rt.set_property(btn, "text", Value::from("a"), &mut world.collab())
        .unwrap();
    rt.advance_to(10, &mut world.collab()).unwrap();
    let renders = world.renderer.calls.len();

    let outcome = rt
        .set_property(btn, "text", Value::from("a"), &mut world.collab())
        .unwrap();
    assert_eq!(outcome, SetOutcome::Unchanged);
    assert!(!rt.has_pending_renders());

    // Coercion happens before the diff: "5" for an integer holding 5 is
    // still a no-op.
    rt.set_property(btn, "count", Value::from(5_i64), &mut world.collab())
        .unwrap();
    rt.advance_to(20, &mut world.collab()).unwrap();
    let outcome = rt
        .set_property(btn, "count", Value::from("5"), &mut world.collab())
        .unwrap();
    assert_eq!(outcome, SetOutcome::Unchanged);

    rt.advance_to(30, &mut world.collab()).unwrap();
    assert_eq!(world.renderer.calls.len(), renders + 1);
}

#[test]
fn attribute_reflection_round_trip() {
    let mut world = World::default();
    let mut rt = button_runtime();
    let btn = node(1);
    world.host.element(btn, "x-button");
    rt.connect(btn, "x-button", &mut world.collab(), 0).unwrap();

    // Boolean true writes an empty attribute, false removes it, with the
    // camelCase name in kebab form.
    rt.set_property(btn, "iconOnly", Value::Bool(true), &mut world.collab())
        .unwrap();
    assert_eq!(world.host.attribute(btn, "icon-only"), Some(""));
    rt.set_property(btn, "iconOnly", Value::Bool(false), &mut world.collab())
        .unwrap();
    assert_eq!(world.host.attribute(btn, "icon-only"), None);

    // Attribute-originated changes map back: `ui5-` stripped, presence is
    // true for booleans.
    rt.attribute_changed(btn, "ui5-icon-only", Some(""), &mut world.collab())
        .unwrap();
    assert_eq!(rt.get_property(btn, "iconOnly").unwrap(), &Value::Bool(true));
    rt.attribute_changed(btn, "ui5-icon-only", None, &mut world.collab())
        .unwrap();
    assert_eq!(
        rt.get_property(btn, "iconOnly").unwrap(),
        &Value::Bool(false)
    );

    // Text reflects its value; undeclared attributes are ignored.
    rt.set_property(btn, "text", Value::from("Go"), &mut world.collab())
        .unwrap();
    assert_eq!(world.host.attribute(btn, "text"), Some("Go"));
    let outcome = rt
        .attribute_changed(btn, "data-custom", Some("x"), &mut world.collab())
        .unwrap();
    assert_eq!(outcome, SetOutcome::Unchanged);
}

#[test]
fn rejected_write_leaves_state_untouched() {
    let mut world = World::default();
    let mut rt = button_runtime();
    let btn = node(1);
    world.host.element(btn, "x-button");
    rt.connect(btn, "x-button", &mut world.collab(), 0).unwrap();

    let err = rt
        .set_property(btn, "count", Value::from("nope"), &mut world.collab())
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::State(StateError::Validation { name: "count", .. })
    ));
    assert_eq!(rt.get_property(btn, "count").unwrap(), &Value::Int(0));
    assert!(!rt.has_pending_renders());
}

#[test]
fn slot_backed_properties_are_get_only() {
    let mut world = World::default();
    let mut rt = list_runtime(None);
    let list = node(1);
    world.host.element(list, "x-list");
    rt.connect(list, "x-list", &mut world.collab(), 0).unwrap();

    let err = rt
        .set_property(list, "items", Value::empty_seq(), &mut world.collab())
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::State(StateError::SlotAssignment { name: "items" })
    ));
    assert_eq!(rt.get_property(list, "items").unwrap(), &Value::empty_seq());
}

#[test]
fn distribution_order_is_document_order_not_resolution_order() {
    let mut world = World::default();
    let mut rt = list_runtime(None);
    let list = node(1);
    let (a, b, c) = (node(101), node(102), node(103));
    world.host.element(list, "x-list");
    world.host.element(a, "x-late");
    world.host.element(b, "span");
    world.host.element(c, "x-later");
    world.host.children.insert(list, vec![a, b, c]);

    rt.connect(list, "x-list", &mut world.collab(), 0).unwrap();
    assert!(!rt.is_ready(list));
    assert!(world.renderer.calls.is_empty());

    // Definitions arrive in reverse document order.
    world.host.defined.insert("x-later".to_string());
    rt.advance_to(10, &mut world.collab()).unwrap();
    assert!(!rt.is_ready(list));

    world.host.defined.insert("x-late".to_string());
    rt.advance_to(20, &mut world.collab()).unwrap();
    assert!(rt.is_ready(list));
    assert_eq!(world.renderer.calls.len(), 1);

    assert_eq!(
        rt.get_property(list, "items").unwrap(),
        &Value::nodes([a, b, c])
    );
}

#[test]
fn expired_definition_wait_drops_children_and_proceeds() {
    let mut world = World::default();
    let mut rt = Runtime::with_distributor(RuntimeConfig::default(), Distributor::with_timeout(100));
    let class = rt
        .declare(ClassDeclaration::new("List").slot(SlotSpec::new("default").property_name("items")))
        .unwrap();
    rt.define("x-list", class, || Box::<Probe>::default())
        .unwrap();

    let list = node(1);
    let (a, b) = (node(101), node(102));
    world.host.element(list, "x-list");
    world.host.element(a, "x-never");
    world.host.element(b, "span");
    world.host.children.insert(list, vec![a, b]);

    rt.connect(list, "x-list", &mut world.collab(), 0).unwrap();
    rt.advance_to(99, &mut world.collab()).unwrap();
    assert!(!rt.is_ready(list));

    rt.advance_to(100, &mut world.collab()).unwrap();
    assert!(rt.is_ready(list));
    assert_eq!(rt.get_property(list, "items").unwrap(), &Value::nodes([b]));
}

#[test]
fn child_changes_route_to_watching_parent_per_filter() {
    let mut world = World::default();
    let mut rt = list_runtime(Some(ListenFor::props(["selected"])));
    let item_class = rt
        .declare(
            ClassDeclaration::new("Item")
                .property("selected", PropertySpec::boolean())
                .property("text", PropertySpec::text("")),
        )
        .unwrap();
    rt.define("x-item", item_class, || Box::<Probe>::default())
        .unwrap();

    let list = node(1);
    let item = node(101);
    world.host.element(list, "x-list");
    world.host.component(item, "x-item", "Item");
    world.host.children.insert(list, vec![item]);

    rt.connect(item, "x-item", &mut world.collab(), 0).unwrap();
    rt.connect(list, "x-list", &mut world.collab(), 0).unwrap();
    rt.advance_to(10, &mut world.collab()).unwrap();
    assert_eq!(rt.render_phase(list), Some(RenderPhase::Clean));

    // An observed property invalidates the parent.
    rt.set_property(item, "selected", Value::Bool(true), &mut world.collab())
        .unwrap();
    assert_eq!(rt.render_phase(list), Some(RenderPhase::Invalidated));
    rt.advance_to(20, &mut world.collab()).unwrap();

    // An unobserved property does not.
    rt.set_property(item, "text", Value::from("hi"), &mut world.collab())
        .unwrap();
    assert_eq!(rt.render_phase(list), Some(RenderPhase::Clean));
    rt.advance_to(30, &mut world.collab()).unwrap();

    // A detached parent is never notified.
    rt.disconnect(list, &mut world.collab()).unwrap();
    rt.set_property(item, "selected", Value::Bool(false), &mut world.collab())
        .unwrap();
    assert_eq!(rt.render_phase(list), None);
    rt.advance_to(40, &mut world.collab()).unwrap();
}

#[test]
fn excluded_properties_never_route() {
    let mut world = World::default();
    let mut rt = list_runtime(Some(ListenFor::all().exclude(["text"])));
    let item_class = rt
        .declare(
            ClassDeclaration::new("Item")
                .property("selected", PropertySpec::boolean())
                .property("text", PropertySpec::text("")),
        )
        .unwrap();
    rt.define("x-item", item_class, || Box::<Probe>::default())
        .unwrap();

    let list = node(1);
    let item = node(101);
    world.host.element(list, "x-list");
    world.host.component(item, "x-item", "Item");
    world.host.children.insert(list, vec![item]);

    rt.connect(item, "x-item", &mut world.collab(), 0).unwrap();
    rt.connect(list, "x-list", &mut world.collab(), 0).unwrap();
    rt.advance_to(10, &mut world.collab()).unwrap();

    rt.set_property(item, "text", Value::from("hi"), &mut world.collab())
        .unwrap();
    assert_eq!(rt.render_phase(list), Some(RenderPhase::Clean));

    rt.set_property(item, "selected", Value::Bool(true), &mut world.collab())
        .unwrap();
    assert_eq!(rt.render_phase(list), Some(RenderPhase::Invalidated));
}

#[test]
fn define_is_idempotent_and_tags_are_first_come() {
    let mut rt = Runtime::new(RuntimeConfig::default());
    let button = button_class(&mut rt);
    let other = rt.declare(ClassDeclaration::new("Other")).unwrap();

    assert_eq!(
        rt.define("x-button", button, || Box::<Probe>::default())
            .unwrap(),
        DefineOutcome::Defined
    );
    assert_eq!(
        rt.define("x-button", button, || Box::<Probe>::default())
            .unwrap(),
        DefineOutcome::AlreadyDefined
    );
    assert_eq!(
        rt.define("x-button", other, || Box::<Probe>::default())
            .unwrap(),
        DefineOutcome::TagTaken
    );
    assert_eq!(rt.registry().tag_class("x-button"), Some(button));
}

#[test]
fn fire_event_dispatches_legacy_then_canonical() {
    let mut world = World::default();
    let mut rt = button_runtime();
    let btn = node(1);
    world.host.element(btn, "x-button");
    rt.connect(btn, "x-button", &mut world.collab(), 0).unwrap();

    let ok = rt
        .fire_event(btn, "click", None, true, &mut world.collab())
        .unwrap();
    assert!(ok);
    assert_eq!(
        world.events.log,
        vec![(btn, "ui5-click".to_string()), (btn, "click".to_string())]
    );

    // Cancelling either dispatch makes the result false; both still fire.
    world.events.log.clear();
    world.events.cancel.insert("click".to_string());
    let ok = rt
        .fire_event(btn, "click", None, true, &mut world.collab())
        .unwrap();
    assert!(!ok);
    assert_eq!(world.events.log.len(), 2);

    // Undeclared event names still dispatch.
    let ok = rt
        .fire_event(btn, "custom-thing", None, false, &mut world.collab())
        .unwrap();
    assert!(ok);
}

#[test]
fn skip_canonical_events_config() {
    let mut world = World::default();
    let mut rt = Runtime::new(RuntimeConfig {
        skip_canonical_events: true,
        ..RuntimeConfig::default()
    });
    let class = button_class(&mut rt);
    rt.define("x-button", class, || Box::<Probe>::default())
        .unwrap();
    let btn = node(1);
    world.host.element(btn, "x-button");
    rt.connect(btn, "x-button", &mut world.collab(), 0).unwrap();

    world.events.cancel.insert("click".to_string());
    let ok = rt
        .fire_event(btn, "click", None, true, &mut world.collab())
        .unwrap();
    assert!(ok);
    assert_eq!(world.events.log, vec![(btn, "ui5-click".to_string())]);
}

#[test]
fn individual_slot_attributes_written_after_render() {
    let mut world = World::default();
    let mut rt = Runtime::new(RuntimeConfig::default());
    let tabs = rt
        .declare(ClassDeclaration::new("Tabs").slot(
            SlotSpec::new("default").property_name("tabs").individual_slots(),
        ))
        .unwrap();
    rt.define("x-tabs", tabs, || Box::<Probe>::default())
        .unwrap();

    let container = node(1);
    let (a, b) = (node(101), node(102));
    world.host.element(container, "x-tabs");
    world.host.element(a, "span");
    world.host.element(b, "span");
    world.host.children.insert(container, vec![a, b]);

    rt.connect(container, "x-tabs", &mut world.collab(), 0)
        .unwrap();

    assert_eq!(world.host.slot_attrs.get(&a).map(String::as_str), Some("default-1"));
    assert_eq!(world.host.slot_attrs.get(&b).map(String::as_str), Some("default-2"));
}

#[test]
fn child_list_mutation_redistributes_in_new_order() {
    let mut world = World::default();
    let mut rt = list_runtime(None);
    let list = node(1);
    let (a, b) = (node(101), node(102));
    world.host.element(list, "x-list");
    world.host.element(a, "span");
    world.host.element(b, "span");
    world.host.children.insert(list, vec![a]);

    rt.connect(list, "x-list", &mut world.collab(), 0).unwrap();
    assert_eq!(rt.get_property(list, "items").unwrap(), &Value::nodes([a]));
    let renders = world.renderer.calls.len();

    world.host.children.insert(list, vec![b, a]);
    rt.children_changed(list, &mut world.collab(), 10).unwrap();
    assert_eq!(
        rt.get_property(list, "items").unwrap(),
        &Value::nodes([b, a])
    );
    assert!(rt.has_pending_renders());

    rt.advance_to(20, &mut world.collab()).unwrap();
    assert_eq!(world.renderer.calls.len(), renders + 1);

    // Re-reporting the same children is absorbed without a render.
    rt.children_changed(list, &mut world.collab(), 30).unwrap();
    assert!(!rt.has_pending_renders());
}

#[test]
fn ready_signalling_and_deferred_focus() {
    let mut world = World::default();
    let mut rt = list_runtime(None);
    let list = node(1);
    let pending = node(101);
    world.host.element(list, "x-list");
    world.host.element(pending, "x-late");
    world.host.children.insert(list, vec![pending]);

    rt.connect(list, "x-list", &mut world.collab(), 0).unwrap();
    assert!(!rt.is_ready(list));
    assert_eq!(rt.dom_ref(list), None);

    let fired = Rc::new(Cell::new(0));
    let observer = fired.clone();
    rt.on_ready(list, move |_| observer.set(observer.get() + 1))
        .unwrap();
    rt.focus(list, &mut world.collab()).unwrap();
    assert!(world.host.focused.is_empty());

    world.host.defined.insert("x-late".to_string());
    rt.advance_to(10, &mut world.collab()).unwrap();

    assert!(rt.is_ready(list));
    assert_eq!(fired.get(), 1);
    assert_eq!(world.host.focused, vec![list]);
    assert_eq!(rt.dom_ref(list), Some(list));
    assert_eq!(rt.focus_dom_ref(list), Some(list));

    // Already-ready instances fire the callback immediately.
    let observer = fired.clone();
    rt.on_ready(list, move |_| observer.set(observer.get() + 1))
        .unwrap();
    assert_eq!(fired.get(), 2);
}

#[test]
fn disconnect_drops_pending_renders_and_fires_exited() {
    let mut world = World::default();
    let mut rt = Runtime::new(RuntimeConfig::default());
    let class = button_class(&mut rt);
    let exited = Rc::new(Cell::new(0));
    let probe_exited = exited.clone();
    rt.define("x-button", class, move || {
        Box::new(Probe {
            exited: probe_exited.clone(),
            with_static: true,
            ..Probe::default()
        })
    })
    .unwrap();

    let btn = node(1);
    world.host.element(btn, "x-button");
    rt.connect(btn, "x-button", &mut world.collab(), 0).unwrap();
    assert_eq!(world.statics.updates, vec![btn]);

    rt.set_property(btn, "text", Value::from("a"), &mut world.collab())
        .unwrap();
    assert!(rt.has_pending_renders());
    let renders = world.renderer.calls.len();

    rt.disconnect(btn, &mut world.collab()).unwrap();
    assert_eq!(exited.get(), 1);
    assert!(!world.host.observed.contains(&btn));
    assert_eq!(world.statics.removed, vec![btn]);

    rt.advance_to(10, &mut world.collab()).unwrap();
    assert_eq!(world.renderer.calls.len(), renders);
    assert!(matches!(
        rt.get_property(btn, "text"),
        Err(RuntimeError::UnknownNode { .. })
    ));
}

#[test]
fn styles_are_passed_through_to_the_renderer() {
    let mut world = World::default();
    world.styles.style = Some(":host { color: red }".to_string());
    let mut rt = button_runtime();
    let btn = node(1);
    world.host.element(btn, "x-button");
    rt.connect(btn, "x-button", &mut world.collab(), 0).unwrap();

    let (_, _, style) = world.renderer.calls.last().unwrap();
    assert_eq!(style.as_deref(), Some(":host { color: red }"));
}

#[test]
fn connect_unknown_tag_fails() {
    let mut world = World::default();
    let mut rt = Runtime::new(RuntimeConfig::default());
    let err = rt
        .connect(node(1), "x-missing", &mut world.collab(), 0)
        .unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownTag { .. }));
}
