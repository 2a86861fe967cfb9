//! Lamina demo.
//!
//! Builds a small app shell (header, sidebar, scrolling message list and a
//! floating tooltip), finalizes it and prints the command stream.

use anyhow::{Context, Result};
use clap::Parser;
use lamina::{
    AlignX, AlignY, AttachPoint, AttachTo, CachedMeasurer, ChildAlignment, Color,
    ComponentRegistry, ElementDeclaration, ElementId, FloatingAttachPoints, FloatingConfig,
    LayoutBuilder, LayoutDirection, LayoutSettings, LayoutSnapshot, MonospaceMeasurer, Padding,
    Point, RenderCommand, RenderData, ScrollConfig, ScrollOffsets, ScrollState, Size, Sizing,
    SizingAxis, TextStyle,
};
use tracing_subscriber::EnvFilter;

const BACKGROUND: Color = Color::rgb(0.08, 0.08, 0.1);
const PANEL: Color = Color::rgb(0.14, 0.14, 0.18);
const ACCENT: Color = Color::rgb(0.35, 0.55, 0.95);
const TEXT: Color = Color::rgb(0.9, 0.9, 0.92);
const MUTED: Color = Color::rgb(0.55, 0.55, 0.6);

#[derive(Parser)]
#[command(about = "Lay out a sample frame and print its paint commands")]
struct Args {
    /// Viewport width in pixels
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Vertical scroll position of the message list
    #[arg(long, default_value_t = 0.0)]
    scroll: f32,

    /// Number of messages in the list
    #[arg(long, default_value_t = 12)]
    messages: u32,

    /// Print commands as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Skip commands for boxes entirely outside the viewport
    #[arg(long)]
    cull: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let viewport = Size::new(args.width, args.height);
    let measurer = CachedMeasurer::new(MonospaceMeasurer::default());
    let components = components();

    let mut list_scroll = ScrollState::new("messages");
    list_scroll.offset.y = args.scroll;

    // First pass learns the scroll limits, second pass uses the clamped position.
    let mut offsets = ScrollOffsets::new();
    list_scroll.apply_to(&mut offsets);
    let snapshot = {
        let first = build_frame(&args, viewport, &measurer, &components, &offsets)?;
        list_scroll.update_from(&first);
        list_scroll.apply_to(&mut offsets);
        build_frame(&args, viewport, &measurer, &components, &offsets)?
    };

    let (cache_hits, cache_misses) = measurer.stats();
    tracing::info!(
        commands = snapshot.commands().len(),
        scroll = list_scroll.offset.y,
        max_scroll = list_scroll.max.y,
        cache_hits,
        cache_misses,
        "frame finalized"
    );

    if args.json {
        let json = serde_json::to_string_pretty(snapshot.commands())
            .context("failed to serialize render commands")?;
        println!("{json}");
    } else {
        print_table(snapshot.commands());
    }
    Ok(())
}

fn build_frame(
    args: &Args,
    viewport: Size,
    measurer: &CachedMeasurer<MonospaceMeasurer>,
    components: &ComponentRegistry,
    offsets: &ScrollOffsets,
) -> Result<LayoutSnapshot> {
    let settings = LayoutSettings {
        cull_offscreen: args.cull,
        ..LayoutSettings::default()
    };
    let mut b = LayoutBuilder::new(viewport, measurer).with_settings(settings);
    b.configure_root(
        ElementDeclaration::new()
            .direction(LayoutDirection::Column)
            .background(BACKGROUND),
    );

    b.component(components, "header")?;
    b.element(
        ElementDeclaration::new()
            .sizing(Sizing::grow())
            .padding(Padding::all(8.0))
            .child_gap(8.0),
        |b| {
            sidebar(b);
            message_list(b, args.messages);
        },
    );

    let arena = b.finish().context("sample tree is malformed")?;
    LayoutSnapshot::build(arena, measurer, offsets).context("layout failed")
}

fn components() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register("header", |b: &mut LayoutBuilder<'_>| {
        b.element(
            ElementDeclaration::new()
                .id("header")
                .sizing(Sizing::new(SizingAxis::grow(), SizingAxis::fixed(40.0)))
                .padding(Padding::symmetric(12.0, 0.0))
                .align(ChildAlignment::new(AlignX::Left, AlignY::Center))
                .background(PANEL),
            |b| {
                b.text("lamina", TextStyle::new(18.0).color(ACCENT));
            },
        );
    });
    registry
}

fn sidebar(b: &mut LayoutBuilder<'_>) {
    b.element(
        ElementDeclaration::new()
            .id("sidebar")
            .sizing(Sizing::new(SizingAxis::fit_between(120.0, 200.0), SizingAxis::grow()))
            .direction(LayoutDirection::Column)
            .padding(Padding::all(8.0))
            .child_gap(4.0)
            .rounded_background(PANEL, 6.0),
        |b| {
            for (i, channel) in ["general", "layout", "rendering"].into_iter().enumerate() {
                let id = ElementId::indexed("channel", i as u32);
                b.element(
                    ElementDeclaration::new()
                        .id(id)
                        .sizing(Sizing::new(SizingAxis::grow(), SizingAxis::fit()))
                        .padding(Padding::symmetric(6.0, 4.0)),
                    |b| {
                        b.text(format!("# {channel}"), TextStyle::default().color(TEXT));
                    },
                );
            }
            b.element(
                ElementDeclaration::new()
                    .id("tooltip")
                    .padding(Padding::all(4.0))
                    .border(ACCENT, 1.0)
                    .background(BACKGROUND)
                    .floating(FloatingConfig {
                        attach_to: AttachTo::Element(ElementId::indexed("channel", 1)),
                        attach_points: FloatingAttachPoints {
                            element: AttachPoint::LeftCenter,
                            parent: AttachPoint::RightCenter,
                        },
                        offset: Point::new(6.0, 0.0),
                        z_index: 10,
                        ..FloatingConfig::default()
                    }),
                |b| {
                    b.text("3 unread", TextStyle::new(12.0).color(MUTED));
                },
            );
        },
    );
}

fn message_list(b: &mut LayoutBuilder<'_>, count: u32) {
    b.element(
        ElementDeclaration::new()
            .id("messages")
            .sizing(Sizing::grow())
            .direction(LayoutDirection::Column)
            .padding(Padding::all(8.0))
            .child_gap(6.0)
            .rounded_background(PANEL, 6.0)
            .scroll(ScrollConfig::vertical()),
        |b| {
            for i in 0..count {
                b.element(
                    ElementDeclaration::new()
                        .id(ElementId::indexed("message", i))
                        .sizing(Sizing::new(SizingAxis::grow(), SizingAxis::fit()))
                        .direction(LayoutDirection::Column)
                        .padding(Padding::all(6.0))
                        .child_gap(2.0),
                    |b| {
                        b.text(format!("user{}", i % 3), TextStyle::new(12.0).color(ACCENT));
                        b.text(
                            "Boxes size themselves from their content, grow into free space and wrap text when squeezed.",
                            TextStyle::default().color(TEXT),
                        );
                    },
                );
            }
        },
    );
}

fn print_table(commands: &[RenderCommand]) {
    println!(
        "{:>4}  {:<10} {:>4}  {:>8} {:>8} {:>8} {:>8}  {}",
        "#", "kind", "z", "x", "y", "w", "h", "detail"
    );
    for (i, command) in commands.iter().enumerate() {
        let rect = command.bounding_box;
        let detail = match &command.data {
            RenderData::Text { text, .. } => format!("{text:?}"),
            RenderData::ClipStart { horizontal, vertical } => {
                format!("h={horizontal} v={vertical}")
            }
            RenderData::Border { width, .. } => format!("width={}", width.top),
            RenderData::Rectangle { .. } | RenderData::ClipEnd => String::new(),
        };
        println!(
            "{:>4}  {:<10} {:>4}  {:>8.1} {:>8.1} {:>8.1} {:>8.1}  {}",
            i,
            format!("{:?}", command.kind()),
            command.z_index,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            detail
        );
    }
}
