use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError,
    },
    thread::{self, JoinHandle},
};

use robosim_core::ObstacleId;

use crate::{
    CollisionProbe, FnTouchListener, Part, SensorContext, SensorError, SensorPort, TouchEvent,
    TouchListener,
};

/// State of a touch sensor as seen by the tick loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TouchState {
    #[default]
    Released,
    Pressed,
}

/// A touch sensor (bumper) plugged into one of the robot's sensor ports.
///
/// The simulation calls [`TouchSensor::tick`] once per frame. A tick re-evaluates the
/// probe against the obstacle field and, on a `Released -> Pressed` or
/// `Pressed -> Released` transition, marks one notification as pending and wakes the
/// sensor's notifier thread. The notifier runs the listener callbacks, so a slow
/// listener never holds up the simulation.
///
/// There is at most one pending notification of each kind. A transition that repeats
/// before its previous notification was delivered is merged into the pending one.
/// When both kinds are pending they are delivered in the order they were first
/// detected. After a merge the last event a listener sees can lag the sensor's
/// state; the next transition brings it back in line.
///
/// The sensor samples once per tick. Contacts that begin and end between two ticks
/// are not seen.
pub struct TouchSensor {
    shared: Arc<Shared>,
    probe: CollisionProbe,
    context: OnceLock<SensorContext>,
    known_obstacles: AtomicUsize,
    notifier: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    port: SensorPort,
    state: Mutex<EngineState>,
    signal: Condvar,
}

struct EngineState {
    /// Last observed contact, from either a tick or a poll.
    contact: Option<ObstacleId>,
    /// Only ticks move this.
    touch: TouchState,
    press_notified: bool,
    release_notified: bool,
    // Bumped on every transition of the kind, so that a transition arriving while its
    // previous notification is being delivered keeps the flag pending.
    press_epoch: u64,
    release_epoch: u64,
    /// Detection sequence of the oldest transition of each kind not yet handed to the
    /// notifier. Orders delivery when both kinds are pending.
    press_since: Option<u64>,
    release_since: Option<u64>,
    sequence: u64,
    listener: Option<Arc<dyn TouchListener>>,
    /// Identifies the live notifier. Bumped each time a notifier is started.
    generation: u64,
    running: bool,
}

/// A notification taken by the notifier, not yet acknowledged.
struct Pending {
    event: TouchEvent,
    epoch: u64,
    listener: Arc<dyn TouchListener>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            contact: None,
            touch: TouchState::Released,
            press_notified: true,
            release_notified: true,
            press_epoch: 0,
            release_epoch: 0,
            press_since: None,
            release_since: None,
            sequence: 0,
            listener: None,
            generation: 0,
            running: false,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.running && self.generation == generation
    }

    fn mark_pending(&mut self, event: TouchEvent) {
        self.sequence += 1;
        let sequence = self.sequence;
        let since = match event {
            TouchEvent::Pressed => {
                self.press_notified = false;
                self.press_epoch += 1;
                &mut self.press_since
            }
            TouchEvent::Released => {
                self.release_notified = false;
                self.release_epoch += 1;
                &mut self.release_since
            }
        };
        // A repeat is merged and keeps its place in line.
        if since.is_none() {
            *since = Some(sequence);
        }
    }

    fn clear_pending(&mut self) {
        self.press_notified = true;
        self.release_notified = true;
        self.press_since = None;
        self.release_since = None;
    }

    fn next_pending(&self) -> Option<TouchEvent> {
        match (self.press_since, self.release_since) {
            (Some(press), Some(release)) if release < press => Some(TouchEvent::Released),
            (Some(_), _) => Some(TouchEvent::Pressed),
            (None, Some(_)) => Some(TouchEvent::Released),
            (None, None) => None,
        }
    }

    /// Hands `event` to the notifier and returns the epoch to acknowledge it with.
    fn take(&mut self, event: TouchEvent) -> u64 {
        match event {
            TouchEvent::Pressed => self.press_since = None,
            TouchEvent::Released => self.release_since = None,
        }
        self.epoch(event)
    }

    fn epoch(&self, event: TouchEvent) -> u64 {
        match event {
            TouchEvent::Pressed => self.press_epoch,
            TouchEvent::Released => self.release_epoch,
        }
    }

    fn acknowledge(&mut self, event: TouchEvent, epoch: u64) {
        if self.epoch(event) != epoch {
            return;
        }
        match event {
            TouchEvent::Pressed => self.press_notified = true,
            TouchEvent::Released => self.release_notified = true,
        }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until a notification is pending, or returns `None` once this notifier
    /// has been stopped or replaced.
    fn wait_for_pending(&self, generation: u64) -> Option<Pending> {
        let mut state = self.lock();
        loop {
            if !state.is_current(generation) {
                return None;
            }
            if let (Some(event), Some(listener)) = (state.next_pending(), state.listener.clone())
            {
                let epoch = state.take(event);
                return Some(Pending {
                    event,
                    epoch,
                    listener,
                });
            }
            state = self
                .signal
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn deliver(&self, listener: &dyn TouchListener, event: TouchEvent) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| match event {
            TouchEvent::Pressed => listener.pressed(self.port),
            TouchEvent::Released => listener.released(self.port),
        }));
        if let Err(payload) = result {
            let err = SensorError::ListenerPanic {
                port: self.port,
                message: panic_message(payload.as_ref()),
            };
            log::error!("{} (while handling {} event)", err, event);
        }
    }
}

fn run_notifier(shared: Arc<Shared>, generation: u64) {
    log::debug!("Touch notifier for {} started", shared.port);
    while let Some(pending) = shared.wait_for_pending(generation) {
        shared.deliver(pending.listener.as_ref(), pending.event);
        let mut state = shared.lock();
        if state.is_current(generation) {
            state.acknowledge(pending.event, pending.epoch);
        }
    }
    log::debug!("Touch notifier for {} stopped", shared.port);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl TouchSensor {
    /// Creates a sensor for `port` with the port's standard bumper probe.
    pub fn new(port: SensorPort) -> Self {
        Self::with_probe(port, CollisionProbe::for_port(port))
    }

    pub fn with_probe(port: SensorPort, probe: CollisionProbe) -> Self {
        Self {
            shared: Arc::new(Shared {
                port,
                state: Mutex::new(EngineState::new()),
                signal: Condvar::new(),
            }),
            probe,
            context: OnceLock::new(),
            known_obstacles: AtomicUsize::new(0),
            notifier: Mutex::new(None),
        }
    }

    pub fn port(&self) -> SensorPort {
        self.shared.port
    }

    pub fn probe(&self) -> &CollisionProbe {
        &self.probe
    }

    /// Binds the sensor to a simulation. A sensor can only be attached once.
    pub fn attach(&self, ctx: SensorContext) -> Result<(), SensorError> {
        self.context
            .set(ctx)
            .map_err(|_| SensorError::AlreadyAttached(self.port()))
    }

    pub fn is_attached(&self) -> bool {
        self.context.get().is_some()
    }

    fn context(&self) -> Result<&SensorContext, SensorError> {
        self.context
            .get()
            .ok_or(SensorError::NotAttached(self.port()))
    }

    fn evaluate(&self, ctx: &SensorContext) -> Result<Option<ObstacleId>, SensorError> {
        let obstacles = ctx.field().all();
        let known = self.known_obstacles.swap(obstacles.len(), Ordering::Relaxed);
        if obstacles.len() > known {
            log::debug!(
                "Touch sensor {} now sees {} obstacle(s), {} new",
                self.port(),
                obstacles.len(),
                obstacles.len() - known
            );
        }
        let pose = ctx.current_pose();
        Ok(self
            .probe
            .first_contact(&pose, &obstacles, ctx.field().tolerance())?)
    }

    /// Runs one detection step. Called by the simulation once per frame.
    pub fn tick(&self) -> Result<(), SensorError> {
        let ctx = self.context()?;
        let contact = self.evaluate(ctx)?;
        let next = match contact {
            Some(_) => TouchState::Pressed,
            None => TouchState::Released,
        };

        let mut state = self.shared.lock();
        state.contact = contact;
        if state.touch == next {
            return Ok(());
        }
        state.touch = next;
        let event = match next {
            TouchState::Pressed => TouchEvent::Pressed,
            TouchState::Released => TouchEvent::Released,
        };
        match contact {
            Some(id) => log::debug!("Touch sensor {} pressed by {}", self.port(), id),
            None => log::debug!("Touch sensor {} released", self.port()),
        }

        if state.listener.is_some() {
            state.mark_pending(event);
            drop(state);
            self.shared.signal.notify_one();
        }
        Ok(())
    }

    /// Polls the sensor: true if the probe touches any obstacle right now.
    ///
    /// Pauses for the context's poll delay first (or yields if it is zero), so that
    /// busy polling loops don't starve the simulation thread. Fails with
    /// [`SensorError::NotAttached`] if the sensor was never added to a robot.
    pub fn is_pressed(&self) -> Result<bool, SensorError> {
        let ctx = self.context()?;
        let delay = ctx.poll_delay();
        if delay.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(delay);
        }

        let contact = self.evaluate(ctx)?;
        self.shared.lock().contact = contact;
        Ok(contact.is_some())
    }

    /// The obstacle touching the probe at the last tick or poll.
    pub fn contact(&self) -> Option<ObstacleId> {
        self.shared.lock().contact
    }

    /// State as of the last tick.
    pub fn state(&self) -> TouchState {
        self.shared.lock().touch
    }

    pub fn has_listener(&self) -> bool {
        self.shared.lock().listener.is_some()
    }

    /// Registers `listener` and starts the notifier thread if it isn't running.
    ///
    /// Replacing a registered listener keeps the running notifier and any pending
    /// notification, which the new listener will receive.
    pub fn attach_listener<L: TouchListener>(&self, listener: L) -> Result<(), SensorError> {
        let mut state = self.shared.lock();
        state.listener = Some(Arc::new(listener));
        if state.running {
            return Ok(());
        }
        state.running = true;
        state.generation += 1;
        state.clear_pending();
        let generation = state.generation;
        drop(state);

        let shared = self.shared.clone();
        let spawned = thread::Builder::new()
            .name(format!("touch-{}", self.port()))
            .spawn(move || run_notifier(shared, generation));
        match spawned {
            Ok(handle) => {
                // A previous notifier that was stopped from inside its own callback
                // may still be unwinding; it exits on its own.
                let _ = self
                    .notifier
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .replace(handle);
                Ok(())
            }
            Err(err) => {
                let mut state = self.shared.lock();
                state.running = false;
                state.listener = None;
                Err(err.into())
            }
        }
    }

    /// Registers a pair of closures as the listener.
    pub fn attach_callbacks<P, R>(&self, pressed: P, released: R) -> Result<(), SensorError>
    where
        P: Fn(SensorPort) + Send + Sync + 'static,
        R: Fn(SensorPort) + Send + Sync + 'static,
    {
        self.attach_listener(FnTouchListener::new(pressed, released))
    }

    /// Removes the listener, drops pending notifications and stops the notifier.
    ///
    /// Waits for a callback that is currently running to return, unless called from
    /// inside that callback.
    pub fn detach_listener(&self) {
        {
            let mut state = self.shared.lock();
            state.listener = None;
            if !state.running {
                return;
            }
            state.running = false;
            state.clear_pending();
        }
        self.shared.signal.notify_all();

        let handle = self
            .notifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                log::error!("Touch notifier for {} panicked", self.port());
            }
        }
    }

    /// Stops the notifier. The sensor can still be polled afterwards.
    pub fn cleanup(&self) {
        self.detach_listener();
    }
}

impl Part for TouchSensor {
    fn name(&self) -> String {
        format!("touch sensor {}", self.port())
    }

    fn attach(&self, ctx: SensorContext) -> Result<(), SensorError> {
        TouchSensor::attach(self, ctx)
    }

    fn act(&self) -> Result<(), SensorError> {
        self.tick()
    }

    fn cleanup(&self) {
        TouchSensor::cleanup(self)
    }
}

impl Drop for TouchSensor {
    fn drop(&mut self) {
        self.detach_listener();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{mpsc, RwLock},
        time::{Duration, Instant},
    };

    use robosim_core::{Angle, Obstacle, ObstacleField, Pose, Vector2};

    use super::*;

    const QUIET: Duration = Duration::from_millis(100);
    const WAIT: Duration = Duration::from_secs(2);

    struct Recorder(Mutex<mpsc::Sender<TouchEvent>>);

    impl Recorder {
        fn new() -> (Self, mpsc::Receiver<TouchEvent>) {
            let (tx, rx) = mpsc::channel();
            (Recorder(Mutex::new(tx)), rx)
        }

        fn send(&self, event: TouchEvent) {
            let _ = self.0.lock().unwrap().send(event);
        }
    }

    impl TouchListener for Recorder {
        fn pressed(&self, _port: SensorPort) {
            self.send(TouchEvent::Pressed);
        }

        fn released(&self, _port: SensorPort) {
            self.send(TouchEvent::Released);
        }
    }

    struct Rig {
        field: Arc<ObstacleField>,
        pose: Arc<RwLock<Pose>>,
        sensor: Arc<TouchSensor>,
    }

    impl Rig {
        /// Front-middle sensor at the origin, facing a wall that starts at x = 50.
        fn new() -> Self {
            let field = Arc::new(ObstacleField::new());
            field.register(
                Obstacle::rectangle(Vector2::new(50.0, -100.0), Vector2::new(60.0, 100.0))
                    .unwrap(),
            );
            let pose = Arc::new(RwLock::new(Pose::default()));
            let sensor = Arc::new(TouchSensor::new(SensorPort::S3));
            let ctx = SensorContext::new(field.clone(), pose.clone())
                .with_poll_delay(Duration::ZERO);
            sensor.attach(ctx).unwrap();
            Rig {
                field,
                pose,
                sensor,
            }
        }

        fn move_to(&self, x: f64) {
            *self.pose.write().unwrap() = Pose::new(Vector2::new(x, 0.0), Angle::default());
        }

        /// Ticks once with the probe touching the wall or well clear of it.
        fn tick(&self, touching: bool) {
            self.move_to(if touching { 40.0 } else { 0.0 });
            self.sensor.tick().unwrap();
        }
    }

    fn drain(rx: &mpsc::Receiver<TouchEvent>) -> Vec<TouchEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.recv_timeout(QUIET) {
            events.push(event);
        }
        events
    }

    #[test]
    fn unattached_sensor_is_a_configuration_error() {
        let sensor = TouchSensor::new(SensorPort::S1);
        assert!(matches!(
            sensor.is_pressed(),
            Err(SensorError::NotAttached(SensorPort::S1))
        ));
        assert!(matches!(sensor.tick(), Err(SensorError::NotAttached(_))));
    }

    #[test]
    fn second_attach_fails() {
        let rig = Rig::new();
        let ctx = SensorContext::new(rig.field.clone(), rig.pose.clone());
        assert!(matches!(
            rig.sensor.attach(ctx),
            Err(SensorError::AlreadyAttached(SensorPort::S3))
        ));
    }

    #[test]
    fn polling_reports_contact() {
        let rig = Rig::new();
        assert!(!rig.sensor.is_pressed().unwrap());
        assert_eq!(rig.sensor.contact(), None);

        rig.move_to(40.0);
        assert!(rig.sensor.is_pressed().unwrap());
        assert_eq!(rig.sensor.contact(), Some(ObstacleId::new(0)));
        // Polling does not drive the state machine.
        assert_eq!(rig.sensor.state(), TouchState::Released);
    }

    #[test]
    fn transitions_are_notified_in_order() {
        let rig = Rig::new();
        let (recorder, rx) = Recorder::new();
        rig.sensor.attach_listener(recorder).unwrap();

        for touching in [false, true, true, false] {
            rig.tick(touching);
        }
        assert_eq!(drain(&rx), vec![TouchEvent::Pressed, TouchEvent::Released]);
    }

    #[test]
    fn repeated_contact_notifies_once() {
        let rig = Rig::new();
        let (recorder, rx) = Recorder::new();
        rig.sensor.attach_listener(recorder).unwrap();

        for _ in 0..20 {
            rig.tick(true);
        }
        assert_eq!(drain(&rx), vec![TouchEvent::Pressed]);
        assert_eq!(rig.sensor.state(), TouchState::Pressed);
    }

    #[test]
    fn late_listener_only_sees_later_transitions() {
        let rig = Rig::new();
        rig.tick(true);

        let (recorder, rx) = Recorder::new();
        rig.sensor.attach_listener(recorder).unwrap();
        rig.tick(true);
        rig.tick(false);
        assert_eq!(drain(&rx), vec![TouchEvent::Released]);
    }

    #[test]
    fn obstacles_registered_mid_run_are_detected() {
        let rig = Rig::new();
        let (recorder, rx) = Recorder::new();
        rig.sensor.attach_listener(recorder).unwrap();

        rig.move_to(-200.0);
        rig.sensor.tick().unwrap();
        rig.field.register(Obstacle::circle(Vector2::new(-189.0, 0.0), 2.0).unwrap());
        rig.sensor.tick().unwrap();

        assert_eq!(rig.sensor.contact(), Some(ObstacleId::new(1)));
        assert_eq!(drain(&rx), vec![TouchEvent::Pressed]);
    }

    #[test]
    fn closures_receive_the_port() {
        let rig = Rig::new();
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        rig.sensor
            .attach_callbacks(
                move |port| {
                    let _ = tx.lock().unwrap().send(port);
                },
                |_| {},
            )
            .unwrap();
        rig.tick(true);
        assert_eq!(rx.recv_timeout(WAIT).unwrap(), SensorPort::S3);
    }

    #[test]
    fn panicking_listener_does_not_stop_notifications() {
        struct Flaky(Recorder);

        impl TouchListener for Flaky {
            fn pressed(&self, _port: SensorPort) {
                panic!("listener bug");
            }

            fn released(&self, port: SensorPort) {
                self.0.released(port);
            }
        }

        let rig = Rig::new();
        let (recorder, rx) = Recorder::new();
        rig.sensor.attach_listener(Flaky(recorder)).unwrap();

        rig.tick(true);
        rig.tick(false);
        assert_eq!(rx.recv_timeout(WAIT).unwrap(), TouchEvent::Released);
        rig.tick(true);
        rig.tick(false);
        assert_eq!(rx.recv_timeout(WAIT).unwrap(), TouchEvent::Released);
        assert!(rig.sensor.has_listener());
    }

    #[test]
    fn detaching_drops_undelivered_notifications() {
        struct Gated {
            events: Recorder,
            entered: Mutex<mpsc::Sender<()>>,
            gate: Mutex<mpsc::Receiver<()>>,
        }

        impl TouchListener for Gated {
            fn pressed(&self, port: SensorPort) {
                self.events.pressed(port);
                let _ = self.entered.lock().unwrap().send(());
                let _ = self.gate.lock().unwrap().recv();
            }

            fn released(&self, port: SensorPort) {
                self.events.released(port);
            }
        }

        let rig = Rig::new();
        let (events, rx) = Recorder::new();
        let (entered_tx, entered_rx) = mpsc::channel();
        let (gate_tx, gate_rx) = mpsc::channel();
        rig.sensor
            .attach_listener(Gated {
                events,
                entered: Mutex::new(entered_tx),
                gate: Mutex::new(gate_rx),
            })
            .unwrap();

        rig.tick(true);
        entered_rx.recv_timeout(WAIT).unwrap();
        // The press callback is blocked; this release is signalled but not delivered.
        rig.tick(false);

        let opener = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            let _ = gate_tx.send(());
        });
        let started = Instant::now();
        rig.sensor.detach_listener();
        assert!(started.elapsed() < WAIT);
        opener.join().unwrap();

        assert!(!rig.sensor.has_listener());
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![TouchEvent::Pressed]);
    }

    #[test]
    fn listener_can_detach_itself() {
        struct OneShot {
            sensor: OnceLock<Arc<TouchSensor>>,
            events: Recorder,
        }

        impl TouchListener for OneShot {
            fn pressed(&self, port: SensorPort) {
                self.events.pressed(port);
                if let Some(sensor) = self.sensor.get() {
                    sensor.detach_listener();
                }
            }
        }

        let rig = Rig::new();
        let (events, rx) = Recorder::new();
        let listener = OneShot {
            sensor: OnceLock::new(),
            events,
        };
        let _ = listener.sensor.set(rig.sensor.clone());
        rig.sensor.attach_listener(listener).unwrap();

        rig.tick(true);
        assert_eq!(rx.recv_timeout(WAIT).unwrap(), TouchEvent::Pressed);
        let deadline = Instant::now() + WAIT;
        while rig.sensor.has_listener() {
            assert!(Instant::now() < deadline);
            thread::sleep(Duration::from_millis(1));
        }
        rig.tick(false);
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn reattaching_restarts_the_notifier() {
        let rig = Rig::new();
        let (first, first_rx) = Recorder::new();
        rig.sensor.attach_listener(first).unwrap();
        rig.sensor.detach_listener();

        let (second, second_rx) = Recorder::new();
        rig.sensor.attach_listener(second).unwrap();
        rig.tick(true);
        assert_eq!(drain(&second_rx), vec![TouchEvent::Pressed]);
        assert!(drain(&first_rx).is_empty());
    }

    #[test]
    fn merged_press_keeps_its_place_before_release() {
        struct GatedRelease {
            events: Recorder,
            entered: Mutex<mpsc::Sender<()>>,
            gate: Mutex<mpsc::Receiver<()>>,
        }

        impl TouchListener for GatedRelease {
            fn pressed(&self, port: SensorPort) {
                self.events.pressed(port);
            }

            fn released(&self, port: SensorPort) {
                self.events.released(port);
                let _ = self.entered.lock().unwrap().send(());
                let _ = self.gate.lock().unwrap().recv();
            }
        }

        let rig = Rig::new();
        let (events, rx) = Recorder::new();
        let (entered_tx, entered_rx) = mpsc::channel();
        let (gate_tx, gate_rx) = mpsc::channel();
        rig.sensor
            .attach_listener(GatedRelease {
                events,
                entered: Mutex::new(entered_tx),
                gate: Mutex::new(gate_rx),
            })
            .unwrap();

        rig.tick(true);
        assert_eq!(rx.recv_timeout(WAIT).unwrap(), TouchEvent::Pressed);
        rig.tick(false);
        entered_rx.recv_timeout(WAIT).unwrap();
        assert_eq!(rx.recv_timeout(WAIT).unwrap(), TouchEvent::Released);

        // While the release callback is held: press, release, press again.
        rig.tick(true);
        rig.tick(false);
        rig.tick(true);
        drop(gate_tx);

        assert_eq!(drain(&rx), vec![TouchEvent::Pressed, TouchEvent::Released]);
        assert_eq!(rig.sensor.state(), TouchState::Pressed);
    }

    #[test]
    fn pending_state_machine_orders_by_detection() {
        let mut state = EngineState::new();
        assert_eq!(state.next_pending(), None);

        // Press, release, press before anything is delivered: the press was first.
        state.mark_pending(TouchEvent::Pressed);
        state.mark_pending(TouchEvent::Released);
        state.mark_pending(TouchEvent::Pressed);
        assert_eq!(state.next_pending(), Some(TouchEvent::Pressed));
        let epoch = state.take(TouchEvent::Pressed);
        state.acknowledge(TouchEvent::Pressed, epoch);
        assert!(state.press_notified);
        assert_eq!(state.next_pending(), Some(TouchEvent::Released));
        let epoch = state.take(TouchEvent::Released);
        assert_eq!(state.next_pending(), None);
        state.acknowledge(TouchEvent::Released, epoch);
        assert!(state.release_notified);

        // A release that arrives while its previous one is being delivered stays
        // pending, and goes after a press detected in between.
        state.mark_pending(TouchEvent::Released);
        let stale = state.take(TouchEvent::Released);
        state.mark_pending(TouchEvent::Pressed);
        state.mark_pending(TouchEvent::Released);
        state.acknowledge(TouchEvent::Released, stale);
        assert!(!state.release_notified);
        assert_eq!(state.next_pending(), Some(TouchEvent::Pressed));
        let epoch = state.take(TouchEvent::Pressed);
        state.acknowledge(TouchEvent::Pressed, epoch);
        assert_eq!(state.next_pending(), Some(TouchEvent::Released));

        state.clear_pending();
        assert_eq!(state.next_pending(), None);
    }
}
