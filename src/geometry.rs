/// Page dimensions in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };
}

/// A position on the page. Origin is the top-left corner, y grows downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box in top-down page coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Area {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Area {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Page size plus a uniform margin; everything else is derived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub page: PageSize,
    pub margin: f32,
}

impl PageGeometry {
    pub fn new(page: PageSize, margin: f32) -> Self {
        Self { page, margin }
    }

    pub fn content_width(&self) -> f32 {
        self.page.width - self.margin * 2.0
    }

    pub fn content_height(&self) -> f32 {
        self.page.height - self.margin * 2.0
    }

    pub fn content_left(&self) -> f32 {
        self.margin
    }

    pub fn content_right(&self) -> f32 {
        self.page.width - self.margin
    }

    pub fn content_top(&self) -> f32 {
        self.margin
    }

    pub fn content_bottom(&self) -> f32 {
        self.page.height - self.margin
    }

    pub fn origin(&self) -> Point {
        Point::new(self.content_left(), self.content_top())
    }
}
