use crate::{
    choreo::{
        Activation,
        dot::DotChoreography,
        hero::HeroReveal,
        nav::{Navigator, SectionId},
        reveal::PortfolioReveal,
        stack::CardStack,
    },
    config::ChoreoConfig,
    coord::session::Session,
    driver::AnimationDriver,
    foundation::core::{Millis, Viewport},
    foundation::error::ChoreoResult,
    geometry::sampler::{GeometrySampler, LayoutProbe},
    timeline::builder::MotionMode,
    viewport::adapter::{ListenerId, ResizeEvent, ViewportAdapter},
};

/// Result of bringing up one section.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionOutcome {
    /// The section is running.
    Activated(Activation),
    /// The section failed; the others are unaffected.
    Failed(String),
}

impl SectionOutcome {
    fn from_result(section: &str, result: ChoreoResult<Activation>) -> Self {
        match result {
            Ok(a) => Self::Activated(a),
            Err(err) => {
                tracing::warn!(section, %err, "section failed to activate");
                Self::Failed(err.to_string())
            }
        }
    }

    /// Activation, when the section did not fail.
    pub fn activation(&self) -> Option<Activation> {
        match self {
            Self::Activated(a) => Some(*a),
            Self::Failed(_) => None,
        }
    }
}

/// Per-section outcome of [`Stage::mount`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct MountReport {
    /// Hero name reveal.
    pub hero: SectionOutcome,
    /// Letter dot.
    pub dot: SectionOutcome,
    /// Portfolio header reveal.
    pub reveal: SectionOutcome,
    /// Card stack.
    pub stack: SectionOutcome,
    /// Number of sections the navigator found.
    pub nav_sections: usize,
}

/// Top-level orchestrator owned by the host.
///
/// Holds the page [`Session`] and every choreography. The host forwards mount, scroll,
/// animation-frame, resize and unmount events; nothing here runs on its own.
#[derive(Debug)]
pub struct Stage {
    config: ChoreoConfig,
    session: Session,
    sampler: GeometrySampler,
    adapter: ViewportAdapter,
    listener: Option<ListenerId>,
    hero: HeroReveal,
    dot: DotChoreography,
    reveal: PortfolioReveal,
    stack: CardStack,
    navigator: Navigator,
    scroll_y: f64,
    resize_events: u64,
}

impl Stage {
    /// Stage with a fresh session.
    pub fn new(config: ChoreoConfig, viewport: Viewport) -> ChoreoResult<Self> {
        let session = Session::init(&config);
        Self::with_session(config, session, viewport)
    }

    /// Stage reusing a session from an earlier mount, as a component remount would.
    pub fn with_session(
        config: ChoreoConfig,
        session: Session,
        viewport: Viewport,
    ) -> ChoreoResult<Self> {
        config.validate()?;
        let sampler = config.sampler();
        let reduced = config.reduced_motion;
        Ok(Self {
            adapter: ViewportAdapter::new(viewport, config.breakpoints, config.viewport),
            listener: None,
            hero: HeroReveal::new(config.hero.clone()),
            dot: DotChoreography::new(config.dot.clone(), sampler.clone(), config.retry, reduced),
            reveal: PortfolioReveal::new(config.reveal.clone(), sampler.clone(), reduced),
            stack: CardStack::new(config.stack.clone(), sampler.clone(), reduced),
            navigator: Navigator::new(config.nav.clone()),
            sampler,
            session,
            config,
            scroll_y: 0.0,
            resize_events: 0,
        })
    }

    /// Page session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Give the session back, for a later remount.
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Hero name reveal.
    pub fn hero(&self) -> &HeroReveal {
        &self.hero
    }

    /// Letter dot.
    pub fn dot(&self) -> &DotChoreography {
        &self.dot
    }

    /// Portfolio header reveal.
    pub fn reveal(&self) -> &PortfolioReveal {
        &self.reveal
    }

    /// Card stack.
    pub fn stack(&self) -> &CardStack {
        &self.stack
    }

    /// Section navigation, for registering callbacks.
    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    /// Section navigation.
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Viewport adapter.
    pub fn adapter(&self) -> &ViewportAdapter {
        &self.adapter
    }

    /// Accepted resize events so far.
    pub fn resize_events(&self) -> u64 {
        self.resize_events
    }

    /// Attach the resize listener and activate every section independently.
    #[tracing::instrument(skip_all, fields(scroll_y))]
    pub fn mount<P, D>(
        &mut self,
        now: Millis,
        scroll_y: f64,
        probe: &mut P,
        driver: &mut D,
    ) -> MountReport
    where
        P: LayoutProbe + ?Sized,
        D: AnimationDriver + ?Sized,
    {
        if self.listener.is_none() {
            self.listener = Some(self.adapter.attach());
        }
        self.scroll_y = scroll_y;

        let hero_motion = if self.config.reduced_motion {
            MotionMode::SkipToFinal
        } else {
            MotionMode::Full
        };
        let hero = SectionOutcome::from_result(
            "hero",
            self.hero.activate(now, &mut self.session, hero_motion, driver),
        );
        let nav_sections =
            self.navigator
                .measure(now, scroll_y, &mut self.session, &self.sampler, probe);
        self.navigator.update_bar(&self.session, driver);

        let dot = SectionOutcome::from_result(
            "dot",
            self.dot.activate(now, &mut self.session, probe, driver),
        );
        let reveal = SectionOutcome::from_result(
            "reveal",
            self.reveal
                .activate(now, scroll_y, &mut self.session, probe, driver),
        );
        let stack = SectionOutcome::from_result(
            "stack",
            self.stack
                .activate(now, scroll_y, &mut self.session, probe, driver),
        );

        MountReport {
            hero,
            dot,
            reveal,
            stack,
            nav_sections,
        }
    }

    /// Forward a scroll position to the scroll-driven sections.
    pub fn scroll<D: AnimationDriver + ?Sized>(&mut self, scroll_y: f64, driver: &mut D) {
        self.scroll_y = scroll_y;
        self.reveal.scroll(scroll_y, &mut self.session, driver);
        self.stack.scroll(scroll_y, &mut self.session, driver);
    }

    /// Record a raw resize notification; it is applied by a later [`Stage::tick`].
    pub fn resize(&mut self, now: Millis, viewport: Viewport) {
        self.adapter.on_resize(now, viewport);
    }

    /// Advance time-driven sections and apply debounced resizes.
    pub fn tick<P, D>(&mut self, now: Millis, probe: &mut P, driver: &mut D)
    where
        P: LayoutProbe + ?Sized,
        D: AnimationDriver + ?Sized,
    {
        self.hero.tick(now, &mut self.session, driver);
        self.navigator.update_bar(&self.session, driver);
        if let Err(err) = self.dot.tick(now, &mut self.session, probe, driver) {
            tracing::warn!(%err, "dot tick failed");
        }
        if let Some(event) = self.adapter.poll(now) {
            self.apply_resize(now, event, probe, driver);
        }
    }

    /// Scroll target of a section, notifying navigation callbacks.
    pub fn navigate(&mut self, id: SectionId) -> Option<f64> {
        self.navigator.navigate(id)
    }

    /// Kill and hide every section and detach the resize listener.
    pub fn unmount<D: AnimationDriver + ?Sized>(&mut self, driver: &mut D) {
        self.hero.deactivate(driver);
        self.dot.deactivate(&mut self.session, driver);
        self.reveal.deactivate(&mut self.session, driver);
        self.stack.deactivate(&mut self.session, driver);
        if let Some(id) = self.listener.take() {
            self.adapter.detach(id);
        }
    }

    fn apply_resize<P, D>(&mut self, now: Millis, event: ResizeEvent, probe: &mut P, driver: &mut D)
    where
        P: LayoutProbe + ?Sized,
        D: AnimationDriver + ?Sized,
    {
        self.resize_events += 1;
        tracing::info!(
            width = event.viewport.width,
            height = event.viewport.height,
            class_changed = event.class_changed,
            "re-sampling geometry after resize"
        );
        let y = self.scroll_y;
        self.session.invalidate_geometry();
        if let Err(err) = self.dot.reposition(now, &mut self.session, probe, driver) {
            tracing::warn!(%err, "dot reposition failed");
        }
        if let Err(err) = self.reveal.reposition(now, y, &mut self.session, probe, driver) {
            tracing::warn!(%err, "reveal reposition failed");
        }
        if let Err(err) = self.stack.reposition(now, y, &mut self.session, probe, driver) {
            tracing::warn!(%err, "stack reposition failed");
        }
        self.navigator
            .measure(now, y, &mut self.session, &self.sampler, probe);
    }
}
