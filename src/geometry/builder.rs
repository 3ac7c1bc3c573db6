use super::{Contour, Outline, Point, Segment};

/// Accumulates the contours produced by a charstring or glyph record decoder.
///
/// Decoders speak in relative moves; the builder tracks the current point and
/// stores absolute coordinates. An open contour is flushed by `close_path`
/// or, for formats that leave the final contour implicitly closed, by
/// `finish`.
#[derive(Debug)]
pub struct OutlineBuilder {
    outline: Outline,
    current_contour: Option<Contour>,
    current_point: Point,

    /// Left side bearing set by `hsbw`/`sbw`; the advance lives next to it
    pub left_side_bearing: Point,
    pub advance: Point,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self {
            outline: Outline::empty(),
            current_contour: None,
            current_point: Point::origin(),
            left_side_bearing: Point::origin(),
            advance: Point::origin(),
        }
    }

    pub fn current_point(&self) -> Point {
        self.current_point
    }

    pub fn set_side_bearing_and_advance(&mut self, sb: Point, advance: Point) {
        self.left_side_bearing = sb;
        self.advance = advance;
        self.current_point = sb;
    }

    pub fn move_to(&mut self, point: Point) {
        self.end_contour();
        self.current_point = point;
    }

    pub fn relative_move_to(&mut self, dx: f32, dy: f32) {
        let point = Point::new(self.current_point.x + dx, self.current_point.y + dy);
        self.move_to(point);
    }

    pub fn line_to(&mut self, end: Point) {
        self.push(Segment::Line { end });
    }

    pub fn relative_line_to(&mut self, dx: f32, dy: f32) {
        let end = Point::new(self.current_point.x + dx, self.current_point.y + dy);
        self.line_to(end);
    }

    pub fn quadratic_curve_to(&mut self, control: Point, end: Point) {
        self.push(Segment::Quadratic { control, end });
    }

    pub fn cubic_curve_to(&mut self, control1: Point, control2: Point, end: Point) {
        self.push(Segment::Cubic {
            control1,
            control2,
            end,
        });
    }

    pub fn relative_cubic_curve_to(
        &mut self,
        dx1: f32,
        dy1: f32,
        dx2: f32,
        dy2: f32,
        dx3: f32,
        dy3: f32,
    ) {
        let current = self.current_point;

        let control1 = Point::new(current.x + dx1, current.y + dy1);
        let control2 = Point::new(control1.x + dx2, control1.y + dy2);
        let end = Point::new(control2.x + dx3, control2.y + dy3);

        self.cubic_curve_to(control1, control2, end);
    }

    /// Draws the closing line back to the contour start if one is needed,
    /// then flushes the contour.
    pub fn close_path(&mut self) {
        if let Some(start) = self.current_contour.as_ref().map(|c| c.start) {
            if self.current_point != start {
                self.line_to(start);
            }
            self.current_point = start;
        }
        self.end_contour();
    }

    fn push(&mut self, segment: Segment) {
        let contour = self.current_contour.get_or_insert_with(|| Contour {
            start: self.current_point,
            segments: Vec::new(),
        });

        contour.segments.push(segment);
        self.current_point = segment.end();
    }

    /// Repositions the pen without opening or closing a contour. Used by
    /// decoders whose formats adjust the current point out of band
    /// (`setcurrentpoint`, flex accumulation).
    pub fn update_current_point(&mut self, point: Point) {
        self.current_point = point;
    }

    /// Appends already-built contours, leaving the pen untouched.
    pub fn append(&mut self, outline: Outline) {
        self.outline.contours.extend(outline.contours);
    }

    fn end_contour(&mut self) {
        if let Some(contour) = self.current_contour.take() {
            if !contour.segments.is_empty() {
                self.outline.contours.push(contour);
            }
        }
    }

    pub fn finish(mut self) -> Outline {
        self.end_contour();
        self.outline
    }
}
