#![forbid(unsafe_code)]

//! Cell styling: colors, attributes, and SGR conversion in both directions.
//!
//! A [`Style`] is read from parsed SGR parameters (`Style::apply_sgr`) and
//! written back out as the shortest escape sequence that moves the terminal
//! from one style to another (`Style::diff_to`). The "no color" state is
//! `Option::None`, distinct from any explicit color — a style that never set
//! a foreground must not emit a reset code for it.

use std::io::{self, Write};

use bitflags::bitflags;
use cellwire_vt::{Param, Params};
use smallvec::SmallVec;

/// A concrete terminal color. "Use the terminal default" is expressed as
/// `Option<Color>::None` on [`Style`], not as a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// One of the 16 base palette entries (0-7 normal, 8-15 bright).
    Named(u8),
    /// 256-color palette index.
    Indexed(u8),
    /// 24-bit direct color.
    Rgb(u8, u8, u8),
}

bitflags! {
    /// SGR attribute flags.
    ///
    /// Underline is a separate enumeration ([`UnderlineStyle`]) because it
    /// has five styles, not an on/off bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttrFlags: u16 {
        const BOLD          = 1 << 0;
        const FAINT         = 1 << 1;
        const ITALIC        = 1 << 2;
        const SLOW_BLINK    = 1 << 3;
        const RAPID_BLINK   = 1 << 4;
        const REVERSE       = 1 << 5;
        const CONCEAL       = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
    }
}

/// Underline rendering style (SGR `4`, `4:n`, `21`, `24`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnderlineStyle {
    #[default]
    None,
    Single,
    Double,
    Curly,
    Dotted,
    Dashed,
}

impl UnderlineStyle {
    fn from_code(n: u16) -> Self {
        match n {
            1 => UnderlineStyle::Single,
            2 => UnderlineStyle::Double,
            3 => UnderlineStyle::Curly,
            4 => UnderlineStyle::Dotted,
            5 => UnderlineStyle::Dashed,
            _ => UnderlineStyle::None,
        }
    }

    const fn code(self) -> u8 {
        match self {
            UnderlineStyle::None => 0,
            UnderlineStyle::Single => 1,
            UnderlineStyle::Double => 2,
            UnderlineStyle::Curly => 3,
            UnderlineStyle::Dotted => 4,
            UnderlineStyle::Dashed => 5,
        }
    }
}

/// The visual attributes of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    /// Underline color (SGR 58/59), independent of the underline style.
    pub ul: Option<Color>,
    pub attrs: AttrFlags,
    pub underline: UnderlineStyle,
}

/// One logical piece of an SGR sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sgr {
    Code(u8),
    /// `4:n` colon form for extended underline styles.
    Underline(u8),
    Fg(Color),
    Bg(Color),
    Ul(Color),
}

impl Style {
    /// All fields at their defaults: no colors, no attributes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }

    // ── SGR reading ─────────────────────────────────────────────────

    /// Apply a parsed SGR parameter list to this style.
    ///
    /// Handles 0-9, 21-29, 30-49, 58/59, 90-97, 100-107, and the extended
    /// color forms `38;5;n` / `38;2;r;g;b` in both semicolon and colon
    /// notation, plus `4:n` underline styles. Unknown codes are skipped.
    /// An empty parameter list means reset, as does an explicit 0.
    pub fn apply_sgr(&mut self, params: &Params) {
        if params.is_empty() {
            *self = Style::default();
            return;
        }

        let ps = params.as_slice();
        let mut i = 0;
        while i < ps.len() {
            if ps[i].has_more() {
                // Colon-joined group: find its extent, apply as a unit.
                let start = i;
                while i < ps.len() && ps[i].has_more() {
                    i += 1;
                }
                let end = (i + 1).min(ps.len());
                self.apply_group(&ps[start..end]);
                i = end;
                continue;
            }

            match ps[i].value_or(0) {
                0 => *self = Style::default(),
                1 => self.attrs |= AttrFlags::BOLD,
                2 => self.attrs |= AttrFlags::FAINT,
                3 => self.attrs |= AttrFlags::ITALIC,
                4 => self.underline = UnderlineStyle::Single,
                5 => self.attrs |= AttrFlags::SLOW_BLINK,
                6 => self.attrs |= AttrFlags::RAPID_BLINK,
                7 => self.attrs |= AttrFlags::REVERSE,
                8 => self.attrs |= AttrFlags::CONCEAL,
                9 => self.attrs |= AttrFlags::STRIKETHROUGH,
                21 => self.underline = UnderlineStyle::Double,
                22 => self.attrs &= !(AttrFlags::BOLD | AttrFlags::FAINT),
                23 => self.attrs &= !AttrFlags::ITALIC,
                24 => self.underline = UnderlineStyle::None,
                25 => self.attrs &= !(AttrFlags::SLOW_BLINK | AttrFlags::RAPID_BLINK),
                27 => self.attrs &= !AttrFlags::REVERSE,
                28 => self.attrs &= !AttrFlags::CONCEAL,
                29 => self.attrs &= !AttrFlags::STRIKETHROUGH,
                n @ 30..=37 => self.fg = Some(Color::Named((n - 30) as u8)),
                38 => {
                    let (color, used) = parse_color_params(&ps[i..]);
                    if let Some(c) = color {
                        self.fg = Some(c);
                    }
                    i += used;
                    continue;
                }
                39 => self.fg = None,
                n @ 40..=47 => self.bg = Some(Color::Named((n - 40) as u8)),
                48 => {
                    let (color, used) = parse_color_params(&ps[i..]);
                    if let Some(c) = color {
                        self.bg = Some(c);
                    }
                    i += used;
                    continue;
                }
                49 => self.bg = None,
                58 => {
                    let (color, used) = parse_color_params(&ps[i..]);
                    if let Some(c) = color {
                        self.ul = Some(c);
                    }
                    i += used;
                    continue;
                }
                59 => self.ul = None,
                n @ 90..=97 => self.fg = Some(Color::Named((n - 90 + 8) as u8)),
                n @ 100..=107 => self.bg = Some(Color::Named((n - 100 + 8) as u8)),
                _ => {}
            }
            i += 1;
        }
    }

    /// Apply one colon-joined subparameter group.
    fn apply_group(&mut self, group: &[Param]) {
        let Some(head) = group.first() else {
            return;
        };
        match head.value_or(0) {
            4 => {
                let n = group.get(1).map_or(1, |p| p.value_or(0));
                self.underline = UnderlineStyle::from_code(n);
            }
            38 => {
                if let Some(c) = parse_colon_color(group) {
                    self.fg = Some(c);
                }
            }
            48 => {
                if let Some(c) = parse_colon_color(group) {
                    self.bg = Some(c);
                }
            }
            58 => {
                if let Some(c) = parse_colon_color(group) {
                    self.ul = Some(c);
                }
            }
            _ => {}
        }
    }

    // ── SGR writing ─────────────────────────────────────────────────

    /// Write the escape sequence that takes a terminal from `self` to `next`.
    ///
    /// Only the differing attributes are emitted, combined into one CSI. A
    /// transition to the empty style is a single `CSI m` reset. Equal styles
    /// write nothing.
    pub fn diff_to<W: Write>(&self, next: &Style, w: &mut W) -> io::Result<()> {
        if self == next {
            return Ok(());
        }
        if next.is_empty() {
            return w.write_all(b"\x1b[m");
        }
        write_sgr(w, &self.delta(next))
    }

    /// Write the sequence that produces this style from a reset terminal.
    pub fn write_sgr<W: Write>(&self, w: &mut W) -> io::Result<()> {
        Style::default().diff_to(self, w)
    }

    fn delta(&self, next: &Style) -> SmallVec<[Sgr; 8]> {
        let mut out = SmallVec::new();
        let added = next.attrs.difference(self.attrs);
        let removed = self.attrs.difference(next.attrs);

        // 22 clears both bold and faint; re-assert the survivor.
        if removed.intersects(AttrFlags::BOLD | AttrFlags::FAINT) {
            out.push(Sgr::Code(22));
            if next.attrs.contains(AttrFlags::BOLD) {
                out.push(Sgr::Code(1));
            }
            if next.attrs.contains(AttrFlags::FAINT) {
                out.push(Sgr::Code(2));
            }
        } else {
            if added.contains(AttrFlags::BOLD) {
                out.push(Sgr::Code(1));
            }
            if added.contains(AttrFlags::FAINT) {
                out.push(Sgr::Code(2));
            }
        }

        if removed.contains(AttrFlags::ITALIC) {
            out.push(Sgr::Code(23));
        } else if added.contains(AttrFlags::ITALIC) {
            out.push(Sgr::Code(3));
        }

        // 25 clears both blink speeds.
        if removed.intersects(AttrFlags::SLOW_BLINK | AttrFlags::RAPID_BLINK) {
            out.push(Sgr::Code(25));
            if next.attrs.contains(AttrFlags::SLOW_BLINK) {
                out.push(Sgr::Code(5));
            }
            if next.attrs.contains(AttrFlags::RAPID_BLINK) {
                out.push(Sgr::Code(6));
            }
        } else {
            if added.contains(AttrFlags::SLOW_BLINK) {
                out.push(Sgr::Code(5));
            }
            if added.contains(AttrFlags::RAPID_BLINK) {
                out.push(Sgr::Code(6));
            }
        }

        if removed.contains(AttrFlags::REVERSE) {
            out.push(Sgr::Code(27));
        } else if added.contains(AttrFlags::REVERSE) {
            out.push(Sgr::Code(7));
        }
        if removed.contains(AttrFlags::CONCEAL) {
            out.push(Sgr::Code(28));
        } else if added.contains(AttrFlags::CONCEAL) {
            out.push(Sgr::Code(8));
        }
        if removed.contains(AttrFlags::STRIKETHROUGH) {
            out.push(Sgr::Code(29));
        } else if added.contains(AttrFlags::STRIKETHROUGH) {
            out.push(Sgr::Code(9));
        }

        if self.underline != next.underline {
            match next.underline {
                UnderlineStyle::None => out.push(Sgr::Code(24)),
                UnderlineStyle::Single => out.push(Sgr::Code(4)),
                other => out.push(Sgr::Underline(other.code())),
            }
        }

        if self.fg != next.fg {
            match next.fg {
                Some(c) => out.push(Sgr::Fg(c)),
                None => out.push(Sgr::Code(39)),
            }
        }
        if self.bg != next.bg {
            match next.bg {
                Some(c) => out.push(Sgr::Bg(c)),
                None => out.push(Sgr::Code(49)),
            }
        }
        if self.ul != next.ul {
            match next.ul {
                Some(c) => out.push(Sgr::Ul(c)),
                None => out.push(Sgr::Code(59)),
            }
        }

        out
    }
}

/// Parse a semicolon-form extended color (`38;5;n`, `38;2;r;g;b`) starting at
/// the introducer. Returns the color and how many parameters were consumed.
fn parse_color_params(ps: &[Param]) -> (Option<Color>, usize) {
    match ps.get(1).map(|p| p.value_or(0)) {
        Some(5) => {
            let Some(idx) = ps.get(2) else {
                return (None, ps.len());
            };
            (Some(Color::Indexed(clamp_u8(idx.value_or(0)))), 3)
        }
        Some(2) => {
            if ps.len() < 5 {
                return (None, ps.len());
            }
            let r = clamp_u8(ps[2].value_or(0));
            let g = clamp_u8(ps[3].value_or(0));
            let b = clamp_u8(ps[4].value_or(0));
            (Some(Color::Rgb(r, g, b)), 5)
        }
        _ => (None, 1),
    }
}

/// Parse a colon-form extended color group (`38:5:n`, `38:2::r:g:b`,
/// `38:2:r:g:b`).
fn parse_colon_color(group: &[Param]) -> Option<Color> {
    match group.get(1)?.value_or(0) {
        5 => Some(Color::Indexed(clamp_u8(group.get(2)?.value_or(0)))),
        2 => {
            // ITU-T T.416 allows a color-space ID before the channels; it is
            // present when the group carries six or more members.
            let base = if group.len() >= 6 { 3 } else { 2 };
            let r = clamp_u8(group.get(base)?.value_or(0));
            let g = clamp_u8(group.get(base + 1)?.value_or(0));
            let b = clamp_u8(group.get(base + 2)?.value_or(0));
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

#[inline]
fn clamp_u8(v: u16) -> u8 {
    v.min(255) as u8
}

fn write_sgr<W: Write>(w: &mut W, parts: &[Sgr]) -> io::Result<()> {
    if parts.is_empty() {
        return Ok(());
    }
    w.write_all(b"\x1b[")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            w.write_all(b";")?;
        }
        match *part {
            Sgr::Code(n) => write!(w, "{n}")?,
            Sgr::Underline(n) => write!(w, "4:{n}")?,
            Sgr::Fg(c) => write_color(w, c, 30, 38)?,
            Sgr::Bg(c) => write_color(w, c, 40, 48)?,
            Sgr::Ul(c) => write_color(w, c, 0, 58)?,
        }
    }
    w.write_all(b"m")
}

fn write_color<W: Write>(w: &mut W, color: Color, base: u8, ext: u8) -> io::Result<()> {
    match color {
        // Underline color has no named form; fall through to indexed.
        Color::Named(n) if base > 0 && n < 8 => write!(w, "{}", base + n),
        Color::Named(n) if base > 0 && n < 16 => write!(w, "{}", base + 60 + n - 8),
        Color::Named(n) => write!(w, "{ext};5;{n}"),
        Color::Indexed(n) => write!(w, "{ext};5;{n}"),
        Color::Rgb(r, g, b) => write!(w, "{ext};2;{r};{g};{b}"),
    }
}
