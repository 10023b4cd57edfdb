/// Camera pose in world space. One world unit is one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64, // degrees, never normalized
}

impl Pose {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    /// Unit vector along `angle` degrees.
    #[inline]
    pub fn direction(angle: f64) -> (f64, f64) {
        let rad = angle.to_radians();
        (rad.cos(), rad.sin())
    }

    /// Exact comparison of every field against its own counterpart.
    #[inline]
    pub fn differs(&self, other: &Pose) -> bool {
        self.x != other.x || self.y != other.y || self.heading != other.heading
    }
}

/// Current pose plus the snapshot taken at the last render.
///
/// `previous` is `None` until the first frame is drawn, which keeps the first
/// tick dirty. Moves and rotations overwrite only the fields they touch.
#[derive(Debug, Clone)]
pub struct Camera {
    pose: Pose,
    previous: Option<Pose>,
}

impl Camera {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            previous: None,
        }
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    #[inline]
    pub fn previous(&self) -> Option<Pose> {
        self.previous
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        if let Some(prev) = &mut self.previous {
            prev.x = self.pose.x;
            prev.y = self.pose.y;
        }
        self.pose.x = x;
        self.pose.y = y;
    }

    pub fn turn(&mut self, degrees: f64) {
        if let Some(prev) = &mut self.previous {
            prev.heading = self.pose.heading;
        }
        self.pose.heading += degrees;
    }

    /// Records the pose that was just rendered.
    pub fn snapshot(&mut self) {
        self.previous = Some(self.pose);
    }
}

/// Whether a camera needs a new frame, given the pose rendered last.
#[inline]
pub fn should_render(current: &Pose, previous: Option<&Pose>) -> bool {
    previous.is_none_or(|prev| current.differs(prev))
}
