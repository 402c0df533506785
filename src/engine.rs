//! Processing pipeline
//!
//! One run scans a document or presentation for code, boxes and de-fences
//! what it finds, colors the code by token and finally colors inline code
//! spans in the remaining text. Node handles are stable for the whole run,
//! so all regions are collected before the first one is touched.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use crate::colorize::{colorize_region, colorize_spans};
use crate::delimiter::Delimiters;
use crate::error::{Error, Result};
use crate::host::{DocumentHost, NodeId, NodeKind, SlideHost, TextStore};
use crate::normalize::Normalizer;
use crate::region::CodeRegion;
use crate::registry::StyleRegistry;
use crate::scanner::{scan_shapes, DocumentScanner};
use crate::style::Rgb;
use crate::tokenize::{RuleTokenizer, Tokenizer};

/// Cell color of document code boxes
pub const DEFAULT_CODE_BACKGROUND: Rgb = Rgb(0xff, 0xec, 0xec);

/// Prefix of the per-mode action names
pub const ACTION_PREFIX: &str = "change-color-to-";

/// Run settings that do not come from the theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub delimiters: Delimiters,
    /// Color inline code spans outside code blocks
    pub inline_spans: bool,
    pub code_background: Rgb,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            inline_spans: true,
            code_background: DEFAULT_CODE_BACKGROUND,
        }
    }
}

/// What a run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub regions_found: usize,
    /// Regions newly put into a box (document table or filled shape)
    pub regions_boxed: usize,
    /// Regions colored by token
    pub regions_colored: usize,
    /// Regions left without token coloring
    pub regions_skipped: usize,
    pub spans_colored: usize,
}

/// The code highlighting engine
pub struct Engine<T: Tokenizer = RuleTokenizer> {
    registry: StyleRegistry,
    tokenizer: T,
    settings: Settings,
}

impl Engine<RuleTokenizer> {
    /// Engine with the built-in tokenizer
    pub fn with_builtin_tokenizer(registry: StyleRegistry, settings: Settings) -> Self {
        Self::new(registry, RuleTokenizer::new(), settings)
    }
}

impl<T: Tokenizer> Engine<T> {
    pub fn new(registry: StyleRegistry, tokenizer: T, settings: Settings) -> Self {
        Self {
            registry,
            tokenizer,
            settings,
        }
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Per-mode actions for this engine's registry
    pub fn mode_actions(&self) -> ModeActions {
        ModeActions::new(&self.registry)
    }

    fn normalizer(&self) -> Normalizer<'_> {
        Normalizer::new(&self.registry, self.settings.delimiters, self.settings.code_background)
    }

    /// Token-color a normalized region if its mode is known
    fn color_region<H: TextStore + ?Sized>(
        &self,
        host: &mut H,
        region: &CodeRegion,
        report: &mut RunReport,
    ) -> Result<()> {
        match self.registry.style_for_mode(&region.mode) {
            Some(segment) => {
                colorize_region(host, &self.tokenizer, segment, &region.nodes)?;
                report.regions_colored += 1;
            }
            None => {
                debug!("no token coloring for mode {:?}", region.mode);
                report.regions_skipped += 1;
            }
        }
        Ok(())
    }

    /// Process a word-processing document
    pub fn process_document<H: DocumentHost + ?Sized>(&self, host: &mut H) -> Result<RunReport> {
        let regions = DocumentScanner::new(&*host, self.settings.delimiters, self.settings.code_background)
            .scan_document()?;
        let mut report = RunReport {
            regions_found: regions.len(),
            ..Default::default()
        };
        let code_nodes: HashSet<NodeId> = regions.iter().flat_map(|r| r.nodes.iter().copied()).collect();

        let normalizer = self.normalizer();
        for mut region in regions {
            let was_boxed = region.already_boxed;
            normalizer.normalize_document_region(host, &mut region)?;
            if !was_boxed {
                report.regions_boxed += 1;
            }
            self.color_region(host, &region, &mut report)?;
        }

        if self.settings.inline_spans {
            let mut paragraphs = Vec::new();
            collect_paragraphs(&*host, host.body(), &mut paragraphs)?;
            for paragraph in paragraphs.into_iter().filter(|p| !code_nodes.contains(p)) {
                report.spans_colored += colorize_spans(host, &self.registry, &self.settings.delimiters, paragraph)?;
            }
        }

        info!(
            "document: {} regions, {} boxed, {} colored, {} skipped, {} inline spans",
            report.regions_found,
            report.regions_boxed,
            report.regions_colored,
            report.regions_skipped,
            report.spans_colored
        );
        Ok(report)
    }

    /// Process a slide deck
    pub fn process_presentation<H: SlideHost + ?Sized>(&self, host: &mut H) -> Result<RunReport> {
        let mut report = RunReport::default();
        let normalizer = self.normalizer();

        for slide in host.slides() {
            let shapes = host.shapes(slide)?;
            let regions = scan_shapes(&*host, &self.registry, &self.settings.delimiters, &shapes)?;
            report.regions_found += regions.len();
            let code_shapes: HashSet<NodeId> = regions.iter().flat_map(|r| r.nodes.iter().copied()).collect();

            for mut region in regions {
                let was_boxed = region.already_boxed;
                if !normalizer.normalize_shape(host, &mut region)? {
                    report.regions_skipped += 1;
                    continue;
                }
                if !was_boxed {
                    report.regions_boxed += 1;
                }
                self.color_region(host, &region, &mut report)?;
            }

            if !self.settings.inline_spans {
                continue;
            }
            for shape in shapes.into_iter().filter(|s| !code_shapes.contains(s)) {
                if host.kind(shape)? == NodeKind::TextBox {
                    report.spans_colored += colorize_spans(host, &self.registry, &self.settings.delimiters, shape)?;
                }
            }
        }

        info!(
            "presentation: {} code shapes, {} boxed, {} colored, {} skipped, {} inline spans",
            report.regions_found,
            report.regions_boxed,
            report.regions_colored,
            report.regions_skipped,
            report.spans_colored
        );
        Ok(report)
    }
}

/// All paragraphs of a container in document order, including those in
/// nested tables
fn collect_paragraphs<H: DocumentHost + ?Sized>(host: &H, container: NodeId, out: &mut Vec<NodeId>) -> Result<()> {
    for child in host.children(container)? {
        match host.kind(child)? {
            NodeKind::Paragraph => out.push(child),
            NodeKind::Table => {
                for row in host.children(child)? {
                    for cell in host.children(row)? {
                        collect_paragraphs(host, cell, out)?;
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Lookup table from action name to mode
///
/// Each mode gets an action `change-color-to-<mode>` that gives a shape the
/// mode's fill, so the next run treats it as code of that mode.
#[derive(Debug, Clone)]
pub struct ModeActions {
    actions: BTreeMap<String, (String, Rgb)>,
}

impl ModeActions {
    pub fn new(registry: &StyleRegistry) -> Self {
        let actions = registry
            .modes()
            .filter_map(|mode| {
                let background = registry.style_for_mode(mode)?.background;
                Some((format!("{}{}", ACTION_PREFIX, mode), (mode.to_string(), background)))
            })
            .collect();
        Self { actions }
    }

    /// Action names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn mode(&self, action: &str) -> Option<&str> {
        self.actions.get(action).map(|(mode, _)| mode.as_str())
    }

    /// Run an action on a shape
    pub fn dispatch<H: SlideHost + ?Sized>(&self, host: &mut H, action: &str, shape: NodeId) -> Result<()> {
        let (mode, background) = self
            .actions
            .get(action)
            .ok_or_else(|| Error::Message(format!("unknown action: {}", action)))?;
        debug!("marking {:?} as {} code", shape, mode);
        host.set_solid_fill(shape, *background)
    }
}
