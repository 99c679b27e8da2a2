use std::fs::File;
use std::io::Write;

use anyhow::Result;
use charon::prelude::*;
use layout::backends::svg::SVGWriter;
use layout::gv;
use layout::gv::GraphBuilder;

mod framework;
use framework::{color_target, depth_target, init_logging, read_write_pass, write_pass};

pub fn display_dot(dot: &str, file_name: &str) {
    let mut parser = gv::DotParser::new(dot);
    match parser.process() {
        Ok(g) => {
            let mut svg = SVGWriter::new();
            let mut builder = GraphBuilder::new();
            builder.visit_graph(&g);
            let mut vg = builder.get();
            vg.do_it(false, false, false, &mut svg);
            let svg = svg.finalize();
            let path = std::env::temp_dir().join(file_name);
            let mut f = File::create(&path).unwrap();
            f.write_all(svg.as_bytes()).unwrap();
        }
        Err(e) => {
            parser.print_error();
            println!("dot render error: {}", e);
        }
    }
}

#[test]
fn shadow_opaque_post_pipeline() -> Result<()> {
    init_logging();
    let mut resources = ResourceRegistry::new();
    let depth = depth_target(&mut resources, "depth")?;
    let colour = color_target(&mut resources, "colour")?;
    let output = color_target(&mut resources, "output")?;

    let mut graph: FrameGraph = FrameGraph::new();
    let shadow = graph.add_pass(
        PassBuilder::new("shadow")
            .clear_depth_attachment(depth, ClearDepthStencil::default())?
            .build(),
    );
    let opaque = graph.add_pass(
        PassBuilder::new("opaque")
            .clear_color_attachment(colour, ClearColor::Float([0.0; 4]))?
            .sample_image(depth)
            .build(),
    );
    let post = graph.add_pass(
        PassBuilder::new("post")
            .clear_color_attachment(output, ClearColor::Float([0.0; 4]))?
            .sample_image(colour)
            .build(),
    );

    let compiled = graph.compile(&mut resources)?;
    assert_eq!(compiled.execution_order(), &[shadow, opaque, post]);

    // The opaque -> post edge must transition `colour` from color-attachment
    // write state to shader-read state.
    let deps = compiled.dependencies(post)?;
    let transition = deps
        .transitions()
        .iter()
        .find(|t| t.view == colour)
        .expect("post must depend on colour");
    assert_eq!(transition.from_node, opaque);
    assert_eq!(transition.from.layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
    assert_eq!(transition.to.layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
    assert!(!transition.is_noop());

    let dot = compiled.dot()?;
    for name in ["shadow", "opaque", "post"] {
        assert!(dot.contains(name));
    }
    display_dot(&dot, "charon_shadow_opaque_post.svg");
    Ok(())
}

#[test]
fn independent_passes_compile_in_declaration_order() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let x = color_target(&mut resources, "x")?;
    let y = color_target(&mut resources, "y")?;

    let mut graph: FrameGraph = FrameGraph::new();
    let a = graph.add_pass(write_pass("a", x)?);
    let b = graph.add_pass(write_pass("b", y)?);

    let compiled = graph.compile(&mut resources)?;
    assert_eq!(compiled.execution_order(), &[a, b]);
    assert!(compiled.predecessors(a).is_empty());
    assert!(compiled.predecessors(b).is_empty());
    assert!(compiled.dependencies(a)?.is_empty());
    assert!(compiled.dependencies(b)?.is_empty());
    Ok(())
}

#[test]
fn concurrent_readers_share_a_writer_without_false_edges() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let shared = color_target(&mut resources, "shared")?;
    let out_a = color_target(&mut resources, "out a")?;
    let out_b = color_target(&mut resources, "out b")?;

    let mut graph: FrameGraph = FrameGraph::new();
    let writer = graph.add_pass(write_pass("writer", shared)?);
    let reader_a = graph.add_pass(read_write_pass("reader a", shared, out_a)?);
    let reader_b = graph.add_pass(read_write_pass("reader b", shared, out_b)?);

    let compiled = graph.compile(&mut resources)?;
    assert_eq!(compiled.predecessors(reader_a), vec![writer]);
    assert_eq!(compiled.predecessors(reader_b), vec![writer]);
    assert_eq!(compiled.successors(writer), vec![reader_a, reader_b]);
    assert!(!compiled.successors(reader_a).contains(&reader_b));
    assert!(!compiled.successors(reader_b).contains(&reader_a));
    Ok(())
}

#[test]
fn mutually_consuming_passes_are_a_cycle() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let a = color_target(&mut resources, "a")?;
    let b = color_target(&mut resources, "b")?;

    let mut graph: FrameGraph = FrameGraph::new();
    graph.add_pass(read_write_pass("x", b, a)?);
    graph.add_pass(read_write_pass("y", a, b)?);

    let err = graph.compile(&mut resources).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::CyclicDependency(_))
    ));
    Ok(())
}

#[test]
fn empty_graph_is_rejected() {
    let mut resources = ResourceRegistry::new();
    let graph: FrameGraph = FrameGraph::new();
    let err = graph.compile(&mut resources).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::EmptyGraph));
}

#[test]
fn attachments_must_come_from_the_compiling_registry() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let mut other = ResourceRegistry::new();
    let foreign = color_target(&mut other, "foreign")?;

    let mut graph: FrameGraph = FrameGraph::new();
    graph.add_pass(write_pass("stray", foreign)?);

    let err = graph.compile(&mut resources).unwrap_err();
    assert_eq!(
        err.downcast_ref::<Error>(),
        Some(&Error::DanglingResource("stray".into()))
    );
    Ok(())
}

#[test]
fn back_to_back_writes_stay_ordered() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let target = color_target(&mut resources, "target")?;

    let mut graph: FrameGraph = FrameGraph::new();
    let first = graph.add_pass(write_pass("first", target)?);
    let second = graph.add_pass(write_pass("second", target)?);

    let compiled = graph.compile(&mut resources)?;
    assert_eq!(compiled.execution_order(), &[first, second]);
    // The write-after-write edge exists even though nothing is consumed;
    // both writes leave the resource in the same state, so no barrier.
    let deps = compiled.dependencies(second)?;
    assert_eq!(deps.transitions().len(), 1);
    assert_eq!(deps.transitions()[0].from_node, first);
    assert!(deps.transitions()[0].is_noop());
    assert_eq!(deps.barriers().count(), 0);
    Ok(())
}

#[test]
fn overwrite_waits_for_readers() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let shared = color_target(&mut resources, "shared")?;
    let out = color_target(&mut resources, "out")?;

    let mut graph: FrameGraph = FrameGraph::new();
    let writer = graph.add_pass(write_pass("writer", shared)?);
    let reader = graph.add_pass(read_write_pass("reader", shared, out)?);
    let overwriter = graph.add_pass(write_pass("overwriter", shared)?);

    let compiled = graph.compile(&mut resources)?;
    assert_eq!(compiled.execution_order(), &[writer, reader, overwriter]);
    // The overwrite is held back by the read, not by the previous write.
    assert_eq!(compiled.predecessors(overwriter), vec![reader]);
    Ok(())
}

#[test]
fn reading_a_later_writers_output_reorders_the_passes() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let shared = color_target(&mut resources, "shared")?;
    let out = color_target(&mut resources, "out")?;

    let mut graph: FrameGraph = FrameGraph::new();
    let consumer = graph.add_pass(read_write_pass("consumer", shared, out)?);
    let producer = graph.add_pass(write_pass("producer", shared)?);

    let compiled = graph.compile(&mut resources)?;
    assert_eq!(compiled.execution_order(), &[producer, consumer]);
    assert_eq!(compiled.predecessors(consumer), vec![producer]);
    Ok(())
}

#[test]
fn reading_discarded_content_fails() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let target = color_target(&mut resources, "target")?;
    let out = color_target(&mut resources, "out")?;

    let mut graph: FrameGraph = FrameGraph::new();
    graph.add_pass(
        PassBuilder::new("scratch writer")
            .color_attachment(
                target,
                LoadOp::Clear,
                StoreOp::Discard,
                Some(ClearColor::Float([0.0; 4])),
            )?
            .build(),
    );
    graph.add_pass(read_write_pass("reader", target, out)?);

    let err = graph.compile(&mut resources).unwrap_err();
    assert_eq!(
        err.downcast_ref::<Error>(),
        Some(&Error::UndefinedResourceRead("reader".into(), "target".into()))
    );
    Ok(())
}

#[test]
fn discarded_content_stays_undefined_across_rebuilds() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let target = color_target(&mut resources, "target")?;
    let out = color_target(&mut resources, "out")?;

    // First topology: the final use of `target` discards its content.
    let mut graph: FrameGraph = FrameGraph::new();
    graph.add_pass(
        PassBuilder::new("scratch writer")
            .color_attachment(
                target,
                LoadOp::Clear,
                StoreOp::Discard,
                Some(ClearColor::Float([0.0; 4])),
            )?
            .build(),
    );
    graph.compile(&mut resources)?;
    assert!(resources.is_undefined(resources.image_of(target)?));

    // Rebuilding with a pass that relies on that content must fail.
    let mut graph: FrameGraph = FrameGraph::new();
    graph.add_pass(read_write_pass("reader", target, out)?);
    let err = graph.compile(&mut resources).unwrap_err();
    assert_eq!(
        err.downcast_ref::<Error>(),
        Some(&Error::UndefinedResourceRead("reader".into(), "target".into()))
    );

    // Re-declaring a producer makes the content valid again.
    let mut graph: FrameGraph = FrameGraph::new();
    graph.add_pass(write_pass("producer", target)?);
    graph.add_pass(read_write_pass("reader", target, out)?);
    graph.compile(&mut resources)?;
    assert!(!resources.is_undefined(resources.image_of(target)?));

    // And the next topology may read it as externally provided content.
    let mut graph: FrameGraph = FrameGraph::new();
    graph.add_pass(read_write_pass("reader", target, out)?);
    graph.compile(&mut resources)?;
    Ok(())
}

#[test]
fn failed_compilation_leaves_the_registry_untouched() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let target = color_target(&mut resources, "target")?;
    let out = color_target(&mut resources, "out")?;

    let mut graph: FrameGraph = FrameGraph::new();
    graph.add_pass(
        PassBuilder::new("scratch writer")
            .color_attachment(
                target,
                LoadOp::Clear,
                StoreOp::Discard,
                Some(ClearColor::Float([0.0; 4])),
            )?
            .build(),
    );
    graph.add_pass(read_write_pass("reader", target, out)?);
    assert!(graph.compile(&mut resources).is_err());

    // The discard never happened as far as the registry is concerned.
    assert!(!resources.is_undefined(resources.image_of(target)?));
    Ok(())
}

#[test]
fn cross_queue_edges_request_an_ownership_transfer() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let shared = color_target(&mut resources, "shared")?;
    let out = color_target(&mut resources, "out")?;

    let mut graph: FrameGraph = FrameGraph::new();
    graph.add_pass(write_pass("render", shared)?);
    let consume = graph.add_pass(
        PassBuilder::new("post filter")
            .queue(QueueClass::Compute)
            .sample_image(shared)
            .clear_color_attachment(out, ClearColor::Float([0.0; 4]))?
            .build(),
    );

    let compiled = graph.compile(&mut resources)?;
    let deps = compiled.dependencies(consume)?;
    let transition = deps
        .transitions()
        .iter()
        .find(|t| t.view == shared)
        .expect("post filter must depend on shared");
    assert!(transition.queue_transfer);
    assert_eq!(transition.to.stage, vk::PipelineStageFlags2::COMPUTE_SHADER);
    Ok(())
}

#[test]
fn external_content_enters_through_the_synthetic_root() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let history = color_target(&mut resources, "history")?;
    let out = color_target(&mut resources, "out")?;

    let mut graph: FrameGraph = FrameGraph::new();
    let taa = graph.add_pass(read_write_pass("taa", history, out)?);

    let compiled = graph.compile(&mut resources)?;
    assert_eq!(compiled.execution_order(), &[taa]);
    let deps = compiled.dependencies(taa)?;
    let transition = deps
        .transitions()
        .iter()
        .find(|t| t.view == history)
        .expect("taa must depend on external content");
    assert!(transition.from_node.is_external());
    assert_eq!(transition.from, ResourceState::UNDEFINED);
    assert_eq!(transition.to.layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
    Ok(())
}

#[test]
fn visitor_sees_nodes_in_execution_order_with_their_dependencies() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let shared = color_target(&mut resources, "shared")?;
    let out = color_target(&mut resources, "out")?;

    let mut graph: FrameGraph = FrameGraph::new();
    graph.add_pass(write_pass("producer", shared)?);
    graph.add_pass(read_write_pass("consumer", shared, out)?);
    let compiled = graph.compile(&mut resources)?;

    let mut seen = Vec::new();
    compiled.visit(&mut |node: &GraphNode, deps: &RenderPassDependencies| {
        seen.push((node.pass().name().to_string(), deps.transitions().len()));
    });
    assert_eq!(
        seen,
        vec![("producer".to_string(), 0), ("consumer".to_string(), 1)]
    );
    Ok(())
}

#[test]
fn record_callbacks_run_against_the_executor_context() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let target = color_target(&mut resources, "target")?;

    let mut graph: FrameGraph<Vec<String>> = FrameGraph::new();
    graph.add_pass(
        PassBuilder::new("noop")
            .clear_color_attachment(target, ClearColor::Float([0.0; 4]))?
            .record_fn(|recorded: &mut Vec<String>| {
                recorded.push("noop".to_string());
                Ok(())
            })
            .build(),
    );
    let compiled = graph.compile(&mut resources)?;

    let mut recorded = Vec::new();
    compiled.visit(&mut |node: &GraphNode<Vec<String>>, _: &RenderPassDependencies| {
        node.pass().record(&mut recorded).unwrap();
    });
    assert_eq!(recorded, vec!["noop".to_string()]);
    Ok(())
}

#[test]
fn compiled_graphs_are_shareable_across_threads() -> Result<()> {
    let mut resources = ResourceRegistry::new();
    let shared = color_target(&mut resources, "shared")?;
    let out = color_target(&mut resources, "out")?;

    let mut graph: FrameGraph = FrameGraph::new();
    graph.add_pass(write_pass("producer", shared)?);
    let consumer = graph.add_pass(read_write_pass("consumer", shared, out)?);
    let compiled = graph.compile(&mut resources)?;

    std::thread::scope(|scope| {
        let inspect = scope.spawn(|| compiled.dependencies(consumer).unwrap().transitions().len());
        let mut names = Vec::new();
        compiled.visit(&mut |node: &GraphNode, _: &RenderPassDependencies| {
            names.push(node.pass().name().to_string());
        });
        assert_eq!(names, vec!["producer", "consumer"]);
        assert_eq!(inspect.join().unwrap(), 1);
    });
    Ok(())
}
