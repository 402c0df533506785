//! Terminal output of in-memory documents and presentations
//!
//! Styled runs are written with crossterm color and attribute commands.
//! Code boxes are framed with box-drawing characters, sized by display
//! width so wide characters line up.

use std::io::Write;

use crossterm::{
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
};
use unicode_width::UnicodeWidthStr;

use crate::delimiter::is_line_break;
use crate::error::Result;
use crate::host::{DocumentHost, NodeId, NodeKind, SlideHost, TextStore};
use crate::memdoc::{MemDocument, MemPresentation, StyledRun};
use crate::style::{Rgb, Style};

/// Points per terminal column, for turning indentation into spaces
const POINTS_PER_COLUMN: f32 = 7.2;

type Line = Vec<StyledRun>;

/// Split styled runs at line breaks
fn split_lines(runs: Vec<StyledRun>) -> Vec<Line> {
    let mut lines = vec![Line::new()];
    for run in runs {
        let mut parts = run.text.split(is_line_break).peekable();
        while let Some(part) = parts.next() {
            if let Some(line) = lines.last_mut() {
                if !part.is_empty() {
                    line.push(StyledRun {
                        text: part.to_string(),
                        style: run.style.clone(),
                    });
                }
            }
            if parts.peek().is_some() {
                lines.push(Line::new());
            }
        }
    }
    lines
}

fn line_width(line: &[StyledRun]) -> usize {
    line.iter().map(|run| run.text.width()).sum()
}

fn columns(points: f32) -> usize {
    (points / POINTS_PER_COLUMN).round().max(0.0) as usize
}

fn term_color(color: Rgb) -> Color {
    Color::Rgb {
        r: color.0,
        g: color.1,
        b: color.2,
    }
}

/// Writes styled text to a terminal or any other writer
pub struct Renderer<W: Write> {
    out: W,
    /// Emit color and attribute escape sequences
    color: bool,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render_document(&mut self, doc: &MemDocument) -> Result<()> {
        self.render_container(doc, doc.body(), 0)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn render_presentation(&mut self, pres: &MemPresentation) -> Result<()> {
        for (i, slide) in pres.slides().into_iter().enumerate() {
            if i > 0 {
                queue!(self.out, Print("\n"))?;
            }
            queue!(self.out, Print(format!("[slide {}]\n", i + 1)))?;
            for shape in pres.shapes(slide)? {
                if pres.kind(shape)? != NodeKind::TextBox {
                    continue;
                }
                let lines = split_lines(pres.styled_runs(shape)?);
                match pres.solid_fill(shape)? {
                    Some(fill) => self.write_box(&lines, fill, 0)?,
                    None => {
                        for line in &lines {
                            self.write_line(line, None, 0)?;
                        }
                    }
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn paragraph_lines(&self, doc: &MemDocument, paragraph: NodeId) -> Result<Vec<Line>> {
        let runs = doc.styled_runs(paragraph)?;
        // Zero-size filler paragraphs around nested tables
        if runs.is_empty() && doc.font_size(paragraph) == Some(0.0) {
            return Ok(Vec::new());
        }
        Ok(split_lines(runs))
    }

    fn render_container(&mut self, doc: &MemDocument, container: NodeId, indent: usize) -> Result<()> {
        for child in doc.children(container)? {
            match doc.kind(child)? {
                NodeKind::Paragraph => {
                    let base = doc
                        .indent(child)?
                        .map_or(0, |i| columns(i.start));
                    for line in self.paragraph_lines(doc, child)? {
                        self.write_line(&line, None, indent + base)?;
                    }
                }
                NodeKind::Table => self.render_table(doc, child, indent)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn is_blank(&self, doc: &MemDocument, cell: NodeId) -> Result<bool> {
        for child in doc.children(cell)? {
            if doc.kind(child)? != NodeKind::Paragraph || doc.text_len(child)? > 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn render_table(&mut self, doc: &MemDocument, table: NodeId, indent: usize) -> Result<()> {
        for row in doc.children(table)? {
            let cells = doc.children(row)?;
            let mut offset = 0;
            for cell in cells {
                let children = doc.children(cell)?;
                let all_paragraphs = children
                    .iter()
                    .map(|&c| doc.kind(c))
                    .collect::<Result<Vec<_>>>()?
                    .iter()
                    .all(|&k| k == NodeKind::Paragraph);

                if let (Some(fill), true) = (doc.background(cell)?, all_paragraphs) {
                    let mut lines = Vec::new();
                    for paragraph in children {
                        lines.extend(self.paragraph_lines(doc, paragraph)?);
                    }
                    self.write_box(&lines, fill, indent + offset)?;
                } else if self.is_blank(doc, cell)? {
                    // An empty cell only pushes the following cells right
                    offset += doc.width(cell).map_or(0, columns);
                } else {
                    self.render_container(doc, cell, indent + offset)?;
                }
            }
        }
        Ok(())
    }

    fn write_runs(&mut self, line: &[StyledRun], fill: Option<Rgb>) -> Result<()> {
        for run in line {
            if !self.color {
                queue!(self.out, Print(&run.text))?;
                continue;
            }
            self.set_style(&run.style, fill)?;
            queue!(self.out, Print(&run.text), SetAttribute(Attribute::Reset), ResetColor)?;
        }
        Ok(())
    }

    fn set_style(&mut self, style: &Style, fill: Option<Rgb>) -> Result<()> {
        if let Some(fg) = style.foreground {
            queue!(self.out, SetForegroundColor(term_color(fg)))?;
        }
        if let Some(bg) = style.background.or(fill) {
            queue!(self.out, SetBackgroundColor(term_color(bg)))?;
        }
        if style.bold == Some(true) {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.italic == Some(true) {
            queue!(self.out, SetAttribute(Attribute::Italic))?;
        }
        Ok(())
    }

    fn write_line(&mut self, line: &[StyledRun], fill: Option<Rgb>, indent: usize) -> Result<()> {
        queue!(self.out, Print(" ".repeat(indent)))?;
        self.write_runs(line, fill)?;
        queue!(self.out, Print("\n"))?;
        Ok(())
    }

    /// Frame lines in a box filled with `fill`
    fn write_box(&mut self, lines: &[Line], fill: Rgb, indent: usize) -> Result<()> {
        let inner = lines.iter().map(|l| line_width(l)).max().unwrap_or(0);
        let pad = " ".repeat(indent);
        let rule = "─".repeat(inner + 2);
        queue!(self.out, Print(format!("{}┌{}┐\n", pad, rule)))?;
        for line in lines {
            queue!(self.out, Print(format!("{}│ ", pad)))?;
            self.write_runs(line, Some(fill))?;
            let gap = " ".repeat(inner - line_width(line));
            if self.color {
                queue!(self.out, SetBackgroundColor(term_color(fill)), Print(gap), ResetColor)?;
            } else {
                queue!(self.out, Print(gap))?;
            }
            queue!(self.out, Print(" │\n"))?;
        }
        queue!(self.out, Print(format!("{}└{}┘\n", pad, rule)))?;
        Ok(())
    }
}
