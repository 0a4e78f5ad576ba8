use tracing::{debug, info, warn};

use crate::capabilities::{
    Capabilities, DatabaseOutput, DatabasePath, DatabaseResult, StoragePath, StorageResult,
};
use crate::config::ClientConfig;
use crate::event::{Event, SubscriptionId, UploadId, WriteKind};
use crate::form::{ContactForm, Submission, UploadOutcome};
use crate::list::{Intent, ListController};
use crate::model::{decode_snapshot, Contact, ContactKey, Model};
use crate::picture::ImageSelection;
use crate::reducer::Action;
use crate::route::Route;
use crate::view::{FormView, Screen, ToastView, ViewModel};
use crate::{
    AppError, AppResult, ErrorKind, ToastKind, SUBMIT_SUCCESS_MESSAGE, UPLOAD_SUCCESS_MESSAGE,
};

#[derive(Default)]
pub struct App;

impl App {
    fn start_session(config: ClientConfig, model: &mut Model, caps: &Capabilities) {
        if let Some(id) = &model.subscription {
            debug!(subscription = %id, "session already started");
            return;
        }

        match config.validate() {
            Ok(()) => model.config = config,
            Err(e) => model.report(&AppError::from(e)),
        }

        let path = match model.config.contacts_path() {
            Ok(path) => path,
            Err(e) => {
                model.report(&AppError::from(e));
                return;
            }
        };

        let id = SubscriptionId::generate();
        info!(subscription = %id, path = %path, "subscribing to contacts");

        model.store.dispatch(Action::SetLoading { payload: true });
        model.subscription = Some(id.clone());

        let tag = id.clone();
        caps.database.subscribe(id, path, move |result| Event::SnapshotReceived {
            subscription: tag.clone(),
            result: Box::new(result),
        });
    }

    fn end_session(model: &mut Model, caps: &Capabilities) {
        if let Some(upload) = model.form.as_mut().and_then(ContactForm::take_upload) {
            caps.storage.cancel(upload);
        }

        match model.subscription.take() {
            Some(id) => {
                info!(subscription = %id, "unsubscribing from contacts");
                caps.database.unsubscribe(id);
            }
            None => debug!("session ended without a subscription"),
        }
    }

    fn apply_snapshot(subscription: &SubscriptionId, result: DatabaseResult, model: &mut Model) {
        if model.subscription.as_ref() != Some(subscription) {
            debug!(subscription = %subscription, "ignoring snapshot from stale subscription");
            return;
        }

        match result {
            Ok(DatabaseOutput::Value(bytes)) => match decode_snapshot(&bytes) {
                Ok(collection) => {
                    debug!(
                        records = collection.as_ref().map_or(0, |c| c.len()),
                        "snapshot received"
                    );
                    model.store.dispatch(Action::SetContact {
                        payload: collection,
                    });
                }
                Err(e) => model.report(&AppError::from(e)),
            },
            Ok(other) => warn!(output = ?other, "unexpected output on contacts subscription"),
            Err(e) => model.report(
                &AppError::new(ErrorKind::Subscription, e.to_string())
                    .with_context("subscription", subscription.as_str()),
            ),
        }

        model.store.dispatch(Action::SetLoading { payload: false });
    }

    fn navigate(route: Route, model: &mut Model, caps: &Capabilities) {
        if route == model.route {
            return;
        }

        if let Some(mut form) = model.form.take() {
            if let Some(upload) = form.take_upload() {
                info!(upload = %upload, "canceling upload of closed form");
                caps.storage.cancel(upload);
            }
        }

        match &route {
            Route::ContactForm => model.form = Some(ContactForm::mount(model.store.state())),
            Route::NotFound { path } => warn!(path = %path, "no screen for path"),
            Route::ContactList | Route::ContactDetail => {}
        }

        debug!(from = model.route.path(), to = route.path(), "navigate");
        model.route = route;
    }

    fn follow(intent: Intent, model: &mut Model, caps: &Capabilities) {
        model.store.dispatch(intent.action);
        Self::navigate(intent.route, model, caps);
    }

    fn follow_or_report(intent: AppResult<Intent>, model: &mut Model, caps: &Capabilities) {
        match intent {
            Ok(intent) => Self::follow(intent, model, caps),
            Err(e) => model.report(&e),
        }
    }

    fn contact_path(config: &ClientConfig, key: &ContactKey) -> AppResult<DatabasePath> {
        Ok(config.contacts_path()?.child(key.as_str())?)
    }

    fn write_contact(
        key: &ContactKey,
        contact: &Contact,
        kind: WriteKind,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        let path = match Self::contact_path(&model.config, key) {
            Ok(path) => path,
            Err(e) => {
                model.report(&e.with_context("key", key.as_str()));
                return;
            }
        };

        debug!(path = %path, kind = %kind, "writing contact");

        let tag = key.clone();
        let written = caps.database.set_json(path, contact, move |result| {
            Event::ContactWritten {
                key: tag,
                kind,
                result: Box::new(result),
            }
        });

        if let Err(e) = written {
            model.report(
                &AppError::new(ErrorKind::Write, e.to_string()).with_context("key", key.as_str()),
            );
        }
    }

    fn handle_write_result(
        key: &ContactKey,
        kind: WriteKind,
        result: DatabaseResult,
        model: &mut Model,
    ) {
        match result {
            Ok(DatabaseOutput::Written) => info!(key = %key, kind = %kind, "contact written"),
            Ok(other) => warn!(key = %key, output = ?other, "unexpected output for contact write"),
            Err(e) => model.report(
                &AppError::new(ErrorKind::Write, e.to_string())
                    .with_context("key", key.as_str())
                    .with_context("kind", kind.to_string()),
            ),
        }
    }

    fn submit(model: &mut Model, caps: &Capabilities) {
        let Some(form) = model.form.as_ref() else {
            warn!("submit requested without an open form");
            return;
        };

        let Submission { key, contact, kind } = form.submission(&model.store.state().contacts);
        info!(key = %key, kind = %kind, "submitting contact");

        Self::write_contact(&key, &contact, kind, model, caps);
        model.show_toast(SUBMIT_SUCCESS_MESSAGE, ToastKind::Success);
        model.store.dispatch(Action::clear_pending_edit());
        Self::navigate(Route::ContactList, model, caps);
    }

    fn prepare_upload(
        config: &ClientConfig,
        file_name: &str,
        content_type: Option<String>,
        data: Vec<u8>,
    ) -> AppResult<(ImageSelection, StoragePath)> {
        let selection = ImageSelection::new(file_name, content_type, data, config.max_image_bytes)?;
        let path = StoragePath::new(&config.images_prefix, selection.file_name())?;
        Ok((selection, path))
    }

    fn start_upload(
        file_name: &str,
        content_type: Option<String>,
        data: Vec<u8>,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        if model.form.is_none() {
            warn!(file_name, "image selected without an open form");
            return;
        }

        let prepared = Self::prepare_upload(&model.config, file_name, content_type, data);
        let (selection, path) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                model.report(&e.with_context("file_name", file_name));
                return;
            }
        };

        let Some(form) = model.form.as_mut() else {
            return;
        };

        let id = UploadId::generate();
        if let Some(replaced) = form.begin_upload(id.clone()) {
            info!(upload = %replaced, "replacing in-flight upload");
            caps.storage.cancel(replaced);
        }

        let (width, height) = selection.dimensions();
        info!(
            upload = %id,
            path = %path,
            bytes = selection.len(),
            content_type = selection.content_type(),
            format = ?selection.format(),
            width,
            height,
            "starting upload"
        );

        let content_type = selection.content_type().to_string();
        let tag = id.clone();
        caps.storage.upload(id, path, content_type, selection.into_data(), move |result| {
            Event::UploadProgressed {
                upload: tag.clone(),
                result: Box::new(result),
            }
        });
    }

    fn apply_upload_event(upload: &UploadId, result: StorageResult, model: &mut Model) {
        let Some(form) = model.form.as_mut() else {
            debug!(upload = %upload, "upload report without an open form");
            return;
        };

        match form.apply_upload_event(upload, result) {
            UploadOutcome::Stale => debug!(upload = %upload, "ignoring report for stale upload"),
            UploadOutcome::InFlight { percent, state } => {
                debug!(upload = %upload, percent, state = ?state, "upload progress");
            }
            UploadOutcome::Paused { percent } => info!(upload = %upload, percent, "upload paused"),
            UploadOutcome::Transferred => {
                info!(upload = %upload, "upload transferred");
                model.show_toast(UPLOAD_SUCCESS_MESSAGE, ToastKind::Success);
            }
            UploadOutcome::Repeated => debug!(upload = %upload, "upload already transferred"),
            UploadOutcome::PictureResolved { url, first_notice } => {
                info!(upload = %upload, url = %url, "picture resolved");
                if first_notice {
                    model.show_toast(UPLOAD_SUCCESS_MESSAGE, ToastKind::Success);
                }
            }
            UploadOutcome::Canceled => info!(upload = %upload, "upload canceled"),
            UploadOutcome::Failed(e) => model.report(&e),
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(
            event = event.name(),
            user = event.is_user_initiated(),
            "update"
        );

        match event {
            Event::Noop => {}

            Event::SessionStarted(config) => Self::start_session(config, model, caps),
            Event::SessionEnded => Self::end_session(model, caps),
            Event::SnapshotReceived {
                subscription,
                result,
            } => Self::apply_snapshot(&subscription, *result, model),

            Event::Navigate { path } => Self::navigate(Route::parse(&path), model, caps),

            Event::AddContactRequested => {
                let intent = ListController::new(&model.store).add_new();
                Self::follow(intent, model, caps);
            }
            Event::EditContactRequested { key } => {
                let intent = ListController::new(&model.store).edit(&key);
                Self::follow_or_report(intent, model, caps);
            }
            Event::ViewContactRequested { key } => {
                let intent = ListController::new(&model.store).view_contact(&key);
                Self::follow_or_report(intent, model, caps);
            }
            Event::ToggleStarRequested { key } => {
                match ListController::new(&model.store).toggle_star(&key) {
                    Ok((key, contact)) => {
                        Self::write_contact(&key, &contact, WriteKind::Star, model, caps);
                    }
                    Err(e) => model.report(&e),
                }
            }

            Event::FieldEdited { field, value } => match model.form.as_mut() {
                Some(form) => form.set_field(field, value),
                None => warn!(field = ?field, "field edited without an open form"),
            },
            Event::StarToggled => match model.form.as_mut() {
                Some(form) => form.toggle_star(),
                None => warn!("star toggled without an open form"),
            },
            Event::ImageSelected {
                file_name,
                content_type,
                data,
            } => Self::start_upload(&file_name, content_type, data, model, caps),
            Event::UploadProgressed { upload, result } => {
                Self::apply_upload_event(&upload, *result, model);
            }
            Event::SubmitRequested => Self::submit(model, caps),
            Event::ContactWritten { key, kind, result } => {
                Self::handle_write_result(&key, kind, *result, model);
            }

            Event::DismissToast => model.dismiss_toast(),
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        let screen = match &model.route {
            Route::ContactList => Screen::ContactList(ListController::new(&model.store).view()),
            Route::ContactForm => Screen::ContactForm(match &model.form {
                Some(form) => FormView::from(form),
                None => FormView::from(&ContactForm::mount(model.store.state())),
            }),
            Route::ContactDetail => Screen::ContactDetail {
                contact: model.store.state().contact.clone(),
            },
            Route::NotFound { path } => Screen::NotFound { path: path.clone() },
        };

        ViewModel {
            path: model.route.path().to_string(),
            screen,
            toast: model.active_toast().map(ToastView::from),
            pending_toasts: model.toasts.len(),
        }
    }
}
