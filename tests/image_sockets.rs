//! End-to-end checks of the OpenRouter node's image inputs inside a graph

use egui::Pos2;
use openrouter_node::nodes::{ColorHint, Node, NodeGraph, NodeId, NodeRegistry};
use openrouter_node::{new_graph, Config, OPENROUTER_NODE_TYPE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Inputs declared by the factory ahead of the image family
const FIXED_INPUTS: usize = 5;

struct Fixture {
    graph: NodeGraph,
    chat: NodeId,
    sources: Vec<NodeId>,
}

fn image_source(graph: &mut NodeGraph) -> NodeId {
    let mut node = Node::new(0, "LoadImage", Pos2::ZERO);
    node.add_output("IMAGE", "IMAGE");
    graph.add_node(node)
}

fn text_source(graph: &mut NodeGraph) -> NodeId {
    let mut node = Node::new(0, "PrimitiveString", Pos2::ZERO);
    node.add_output("STRING", "STRING");
    graph.add_node(node)
}

fn fixture(sources: usize) -> Fixture {
    let (mut graph, registry): (NodeGraph, NodeRegistry) = new_graph(&Config::default()).unwrap();
    let node = registry
        .create_node(OPENROUTER_NODE_TYPE, Pos2::new(200.0, 100.0))
        .unwrap();
    let chat = graph.add_node(node);
    let sources = (0..sources).map(|_| image_source(&mut graph)).collect();
    Fixture { graph, chat, sources }
}

fn image_names(graph: &NodeGraph, node: NodeId) -> Vec<String> {
    graph.nodes[&node].inputs[FIXED_INPUTS..]
        .iter()
        .map(|socket| socket.name.clone())
        .collect()
}

fn tail_index(graph: &NodeGraph, node: NodeId) -> usize {
    graph.nodes[&node].inputs.len() - 1
}

/// Checks the family rules plus the host's link bookkeeping
fn assert_settled(graph: &NodeGraph, node: NodeId) {
    let inputs = &graph.nodes[&node].inputs;
    let fixed: Vec<&str> = inputs[..FIXED_INPUTS].iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        fixed,
        vec!["system_prompt", "user_message", "model", "temperature", "chat_mode"]
    );

    let family = &inputs[FIXED_INPUTS..];
    let (tail, connected) = family.split_last().expect("family is never empty");
    assert_eq!(tail.name, "image_");
    assert!(!tail.is_connected());
    assert_eq!(tail.color_hint, ColorHint::Dimmed);

    for (rank, socket) in connected.iter().enumerate() {
        assert_eq!(socket.name, format!("image_{}", rank + 1));
        assert!(socket.is_connected(), "{} is not connected", socket.name);
        assert_eq!(socket.color_hint, ColorHint::Normal);
    }

    for conn in graph.connections.iter().filter(|conn| conn.to_node == node) {
        assert_eq!(inputs[conn.to_port].link, Some(conn.id));
    }
    let linked = inputs.iter().filter(|socket| socket.is_connected()).count();
    assert_eq!(
        linked,
        graph.connections.iter().filter(|conn| conn.to_node == node).count()
    );
}

#[test]
fn fresh_node_has_one_bare_socket() {
    let fx = fixture(0);
    assert_eq!(image_names(&fx.graph, fx.chat), vec!["image_"]);
    assert_eq!(fx.graph.nodes[&fx.chat].inputs[FIXED_INPUTS].type_tag, "*");
    assert_settled(&fx.graph, fx.chat);
}

#[test]
fn connecting_grows_the_family() {
    let mut fx = fixture(3);

    for (i, &source) in fx.sources.clone().iter().enumerate() {
        let tail = tail_index(&fx.graph, fx.chat);
        fx.graph.connect(source, 0, fx.chat, tail).unwrap();
        assert_settled(&fx.graph, fx.chat);
        assert_eq!(image_names(&fx.graph, fx.chat).len(), i + 2);
    }

    assert_eq!(
        image_names(&fx.graph, fx.chat),
        vec!["image_1", "image_2", "image_3", "image_"]
    );
    let inputs = &fx.graph.nodes[&fx.chat].inputs;
    assert_eq!(inputs[FIXED_INPUTS].type_tag, "IMAGE");
    assert_eq!(inputs[FIXED_INPUTS + 3].type_tag, "*");
}

#[test]
fn disconnecting_the_middle_renumbers() {
    let mut fx = fixture(3);
    for &source in &fx.sources.clone() {
        let tail = tail_index(&fx.graph, fx.chat);
        fx.graph.connect(source, 0, fx.chat, tail).unwrap();
    }

    fx.graph.disconnect(fx.chat, FIXED_INPUTS + 1).unwrap();

    assert_eq!(image_names(&fx.graph, fx.chat), vec!["image_1", "image_2", "image_"]);
    assert_settled(&fx.graph, fx.chat);
    // The third source now feeds image_2
    let feeding = fx.graph.incoming(fx.chat, FIXED_INPUTS + 1).unwrap();
    assert_eq!(feeding.from_node, fx.sources[2]);
}

#[test]
fn removing_a_source_node_releases_its_socket() {
    let mut fx = fixture(2);
    for &source in &fx.sources.clone() {
        let tail = tail_index(&fx.graph, fx.chat);
        fx.graph.connect(source, 0, fx.chat, tail).unwrap();
    }

    fx.graph.remove_node(fx.sources[0]);

    assert_eq!(image_names(&fx.graph, fx.chat), vec!["image_1", "image_"]);
    assert_settled(&fx.graph, fx.chat);
    assert_eq!(
        fx.graph.incoming(fx.chat, FIXED_INPUTS).unwrap().from_node,
        fx.sources[1]
    );
}

#[test]
fn fixed_inputs_do_not_touch_the_family() {
    let mut fx = fixture(0);
    let text = text_source(&mut fx.graph);
    fx.graph.nodes.get_mut(&fx.chat).unwrap().take_dirty();

    fx.graph.connect(text, 0, fx.chat, 1).unwrap();
    fx.graph.disconnect(fx.chat, 1).unwrap();

    assert_eq!(image_names(&fx.graph, fx.chat), vec!["image_"]);
    assert!(!fx.graph.nodes.get_mut(&fx.chat).unwrap().take_dirty());
    assert_settled(&fx.graph, fx.chat);
}

#[test]
fn narrowed_socket_rejects_other_types() {
    let mut fx = fixture(1);
    let text = text_source(&mut fx.graph);
    fx.graph.connect(fx.sources[0], 0, fx.chat, FIXED_INPUTS).unwrap();

    assert_eq!(
        fx.graph.connect(text, 0, fx.chat, FIXED_INPUTS),
        Err("Port types are not compatible")
    );
    assert_settled(&fx.graph, fx.chat);
}

#[test]
fn replacing_a_link_keeps_the_socket() {
    let mut fx = fixture(2);
    fx.graph.connect(fx.sources[0], 0, fx.chat, FIXED_INPUTS).unwrap();

    fx.graph.connect(fx.sources[1], 0, fx.chat, FIXED_INPUTS).unwrap();

    assert_eq!(image_names(&fx.graph, fx.chat), vec!["image_1", "image_"]);
    assert_eq!(
        fx.graph.incoming(fx.chat, FIXED_INPUTS).unwrap().from_node,
        fx.sources[1]
    );
    assert_eq!(fx.graph.connections.len(), 1);
    assert_settled(&fx.graph, fx.chat);
}

#[test]
fn saved_graph_keeps_its_sockets() {
    let mut fx = fixture(2);
    for &source in &fx.sources.clone() {
        let tail = tail_index(&fx.graph, fx.chat);
        fx.graph.connect(source, 0, fx.chat, tail).unwrap();
    }

    let json = serde_json::to_string(&fx.graph).unwrap();
    let mut loaded: NodeGraph = serde_json::from_str(&json).unwrap();
    openrouter_node::install(&mut loaded, &Config::default()).unwrap();

    assert_eq!(image_names(&loaded, fx.chat), vec!["image_1", "image_2", "image_"]);
    loaded.disconnect(fx.chat, FIXED_INPUTS).unwrap();
    assert_eq!(image_names(&loaded, fx.chat), vec!["image_1", "image_"]);
    assert_settled(&loaded, fx.chat);
}

#[test]
fn random_editing_keeps_the_family_settled() {
    let mut rng = StdRng::seed_from_u64(0x0b5e55ed);

    for _ in 0..20 {
        let mut fx = fixture(4);
        for _ in 0..60 {
            let inputs = fx.graph.nodes[&fx.chat].inputs.len();
            let family = FIXED_INPUTS..inputs;
            if rng.random_bool(0.6) {
                let source = fx.sources[rng.random_range(0..fx.sources.len())];
                let target = rng.random_range(family);
                // Family sockets are IMAGE or `*`, so image sources always fit
                assert!(fx.graph.connect(source, 0, fx.chat, target).is_ok());
            } else if rng.random_bool(0.1) {
                let index = rng.random_range(0..fx.sources.len());
                fx.graph.remove_node(fx.sources[index]);
                fx.sources[index] = image_source(&mut fx.graph);
            } else {
                let target = rng.random_range(family);
                fx.graph.disconnect(fx.chat, target);
            }
            assert_settled(&fx.graph, fx.chat);
        }
    }
}

#[test]
fn empty_prefix_cannot_swallow_fixed_inputs() {
    let config = Config {
        image_family_prefix: String::new(),
        ..Config::default()
    };
    assert!(new_graph(&config).is_err());

    // A graph built from a valid config keeps every fixed input on first link
    let mut fx = fixture(1);
    let tail = tail_index(&fx.graph, fx.chat);
    fx.graph.connect(fx.sources[0], 0, fx.chat, tail).unwrap();
    assert_eq!(image_names(&fx.graph, fx.chat), vec!["image_1", "image_"]);
    assert_settled(&fx.graph, fx.chat);
}
