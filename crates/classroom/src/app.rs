//! The application shell: session, menu routing, view mounting and the
//! interactive command loop.
//!
//! Views are mounted one at a time; each mount performs the view's own
//! fetches with the session credential and feeds the results into the view's
//! state machine. No data survives a view switch except the session itself.

use crate::api::types::{AddMemberPayload, Announcement, Documentation};
use crate::api::{ApiClient, ApiError};
use crate::config::AppConfig;
use crate::menu::{default_view, MenuEntry, ViewId};
use crate::role::Role;
use crate::session::{Session, SessionStore};
use crate::views::classes::ClassList;
use crate::views::forms::{
    AnnouncementForm, CreateClassForm, DocumentationForm, FormState, JoinClassForm, LoginForm,
    MessageComposer, MessageKind, ProjectForm, RegisterForm, TaskForm,
};
use crate::views::groups::{ProjectBoard, ProjectEntry, ProjectTree};
use crate::views::messages::{Direction, PrivateMessages, PublicMessages, PUBLIC_TEXTS};
use crate::views::review::SubmissionReview;
use crate::views::scoped_list::{ItemFetch, ListMessages, ScopedList};
use crate::views::tasks::{MySubmissions, SubmissionDetail, TaskBoard};
use crate::views::users::UserAdmin;
use chrono::DateTime;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::info;

const ANNOUNCEMENT_TEXTS: ListMessages = ListMessages {
    no_scopes: "Vous n'êtes inscrit à aucune classe pour le moment.",
    no_items: "Aucune annonce pour cette classe.",
    scopes_failed: "Erreur lors du chargement de vos classes.",
    items_failed: "Erreur lors du chargement des annonces.",
};

const DOCUMENTATION_TEXTS: ListMessages = ListMessages {
    no_scopes: "Vous n'êtes inscrit à aucune classe pour le moment.",
    no_items: "Aucun document pour cette classe.",
    scopes_failed: "Erreur lors du chargement de vos classes.",
    items_failed: "Erreur lors du chargement des documents.",
};

const PICKER_EMPTY: &str = "Vous n'avez pas encore créé de classes.";
const PICKER_FAILED: &str = "Erreur lors du chargement de vos classes.";

/// My-submissions screen: the flat list plus an optional drill-down.
struct MySubmissionsScreen {
    list: MySubmissions,
    detail: Option<SubmissionDetail>,
}

enum Screen {
    Login(LoginForm),
    Register(RegisterForm),
    ClassList(ClassList),
    CreateClass(CreateClassForm),
    JoinClass(JoinClassForm),
    CreateAnnouncement(AnnouncementForm),
    Announcements(ScopedList<Announcement>),
    ShareDocumentation(DocumentationForm),
    Documentations(ScopedList<Documentation>),
    AssignTask(TaskForm),
    Tasks(TaskBoard),
    Review(SubmissionReview),
    MySubmissions(MySubmissionsScreen),
    SendMessage(MessageComposer),
    PublicMessages(PublicMessages),
    PrivateMessages(PrivateMessages),
    CreateProject(ProjectForm),
    Projects(ProjectBoard),
    Users(UserAdmin),
}

/// What to do once the current command finished.
enum After {
    Nothing,
    Mount(ViewId),
    /// Registration succeeded: wait briefly, then return to the login view
    DelayedLogin,
}

pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    api: ApiClient,
    session: SessionStore,
    screen: Screen,
    active_label: &'static str,
}

impl App {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(config)?;
        let session = SessionStore::load(&config.session_file);
        Ok(Self {
            api,
            session,
            screen: Screen::Login(LoginForm::default()),
            active_label: "Connexion",
        })
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        // A persisted session lands directly on the role's landing view.
        if let Some(role) = self.role() {
            self.mount(default_view(role)).await;
        }

        loop {
            println!("{}", self.render());
            let line = read_line().await?;
            let Some(line) = line else {
                info!("Input closed, exiting");
                break;
            };
            match self.handle(line.trim()).await {
                Flow::Quit => break,
                Flow::Continue => {}
            }
        }
        Ok(())
    }

    fn role(&self) -> Option<Role> {
        self.session
            .current()
            .and_then(|s| Role::from_wire(&s.user.role))
    }

    fn self_id(&self) -> i64 {
        self.session.current().map(|s| s.user.id).unwrap_or(0)
    }

    fn token_owned(&self) -> Option<String> {
        self.session.require_token().ok().map(str::to_string)
    }

    fn menu(&self) -> &'static [MenuEntry] {
        match self.session.current() {
            Some(session) => crate::menu::menu_for_wire(&session.user.role),
            None => &[],
        }
    }

    // -- mounting -----------------------------------------------------------

    async fn mount(&mut self, view: ViewId) {
        let role = self.role();
        let label = self
            .menu()
            .iter()
            .find(|e| e.view == view)
            .map(|e| e.label);

        let Some(token) = self.token_owned() else {
            self.screen = match view {
                ViewId::Register => Screen::Register(RegisterForm::default()),
                _ => Screen::Login(LoginForm::default()),
            };
            self.active_label = if matches!(view, ViewId::Register) {
                "Inscription"
            } else {
                "Connexion"
            };
            return;
        };

        self.active_label = label.unwrap_or("Classroom");
        self.screen = match view {
            ViewId::Login => Screen::Login(LoginForm::default()),
            ViewId::Register => Screen::Register(RegisterForm::default()),
            ViewId::ClassList => {
                let mut list = ClassList::new(role);
                let result = if list.is_owner_view() {
                    self.api.professor_classes(&token).await
                } else {
                    self.api.my_classes(&token).await
                };
                list.loaded(result);
                Screen::ClassList(list)
            }
            ViewId::CreateClass => Screen::CreateClass(CreateClassForm::default()),
            ViewId::JoinClass => Screen::JoinClass(JoinClassForm::default()),
            ViewId::CreateAnnouncement => {
                let mut form = AnnouncementForm::default();
                let result = self.api.professor_classes(&token).await;
                form.picker.loaded(result, PICKER_EMPTY, PICKER_FAILED);
                Screen::CreateAnnouncement(form)
            }
            ViewId::AnnouncementList => {
                let mut list = ScopedList::new(ANNOUNCEMENT_TEXTS);
                let scopes = self.api.my_classes(&token).await;
                if let Some(fetch) = list.scopes_loaded(scopes) {
                    let items = self.api.announcements(&token, fetch.scope_id).await;
                    list.items_loaded(fetch, items);
                }
                Screen::Announcements(list)
            }
            ViewId::ShareDocumentation => {
                let mut form = DocumentationForm::default();
                let result = self.api.professor_classes(&token).await;
                form.picker.loaded(result, PICKER_EMPTY, PICKER_FAILED);
                Screen::ShareDocumentation(form)
            }
            ViewId::DocumentationList => {
                let mut list = ScopedList::new(DOCUMENTATION_TEXTS);
                let scopes = self.api.my_classes(&token).await;
                if let Some(fetch) = list.scopes_loaded(scopes) {
                    let items = self.api.documentations(&token, fetch.scope_id).await;
                    list.items_loaded(fetch, items);
                }
                Screen::Documentations(list)
            }
            ViewId::AssignTask => {
                let mut form = TaskForm::default();
                let result = self.api.professor_classes(&token).await;
                form.picker.loaded(result, PICKER_EMPTY, PICKER_FAILED);
                Screen::AssignTask(form)
            }
            ViewId::TaskList => {
                let mut board = TaskBoard::new();
                let scopes = self.api.my_classes(&token).await;
                if let Some(fetch) = board.list.scopes_loaded(scopes) {
                    let items = self.api.class_tasks(&token, fetch.scope_id).await;
                    board.list.items_loaded(fetch, items);
                }
                Screen::Tasks(board)
            }
            ViewId::SubmissionReview => {
                let mut review = SubmissionReview::new(role);
                if review.is_authorized() {
                    let scopes = self.api.professor_classes(&token).await;
                    if let Some(fetch) = review.classes_loaded(scopes) {
                        let tasks = self.api.class_tasks(&token, fetch.class_id).await;
                        review.tasks_loaded(fetch, tasks);
                    }
                }
                Screen::Review(review)
            }
            ViewId::MySubmissions => {
                let mut list = MySubmissions::new();
                list.loaded(self.api.my_submissions(&token).await);
                Screen::MySubmissions(MySubmissionsScreen { list, detail: None })
            }
            ViewId::SendMessage => {
                let mut composer = MessageComposer::new(role);
                if composer.public_allowed() {
                    if let Ok(classes) = self.api.professor_classes(&token).await {
                        composer.classes_loaded(classes);
                    }
                }
                match self.api.all_users(&token).await {
                    Ok(users) => composer.recipients_loaded(users, self.self_id()),
                    Err(err) => composer
                        .state
                        .finish_err(&err, "Erreur lors du chargement des données initiales."),
                }
                Screen::SendMessage(composer)
            }
            ViewId::PublicMessageList => {
                let mut list = PublicMessages::new(PUBLIC_TEXTS);
                let scopes = self.api.my_classes(&token).await;
                if let Some(fetch) = list.scopes_loaded(scopes) {
                    let items = self.api.public_messages(&token, fetch.scope_id).await;
                    list.items_loaded(fetch, items);
                }
                Screen::PublicMessages(list)
            }
            ViewId::PrivateMessageList => {
                let mut list = PrivateMessages::new(self.self_id());
                list.loaded(self.api.private_messages(&token).await);
                Screen::PrivateMessages(list)
            }
            ViewId::CreateProject => {
                let mut form = ProjectForm::default();
                let result = self.api.professor_classes(&token).await;
                form.picker.loaded(result, PICKER_EMPTY, PICKER_FAILED);
                Screen::CreateProject(form)
            }
            ViewId::ProjectList => {
                let mut board = ProjectBoard::new(role);
                let scopes = self.api.my_classes(&token).await;
                if let Some(fetch) = board.classes_loaded(scopes) {
                    let tree =
                        fetch_project_tree(&self.api, &token, fetch.class_id, board.can_manage())
                            .await;
                    board.tree_loaded(fetch, tree);
                }
                Screen::Projects(board)
            }
            ViewId::UserManagement => {
                let mut admin = UserAdmin::new(role, self.self_id());
                if admin.is_authorized() {
                    admin.users_loaded(self.api.all_users(&token).await);
                }
                Screen::Users(admin)
            }
        };
    }

    // -- command handling ---------------------------------------------------

    async fn handle(&mut self, line: &str) -> Flow {
        if line.is_empty() {
            return Flow::Continue;
        }
        match line {
            "q" | "quitter" => return Flow::Quit,
            "deconnexion" => {
                self.session.clear();
                self.screen = Screen::Login(LoginForm::default());
                self.active_label = "Connexion";
                return Flow::Continue;
            }
            "connexion" if self.session.current().is_none() => {
                self.mount(ViewId::Login).await;
                return Flow::Continue;
            }
            "inscription" if self.session.current().is_none() => {
                self.mount(ViewId::Register).await;
                return Flow::Continue;
            }
            _ => {}
        }

        if let Some(rest) = line.strip_prefix("ouvrir ") {
            if let Some(index) = parse_index(rest) {
                if let Some(entry) = self.menu().get(index) {
                    let view = entry.view;
                    self.mount(view).await;
                }
            }
            return Flow::Continue;
        }

        let after = self.handle_in_view(line).await;
        match after {
            After::Nothing => {}
            After::Mount(view) => self.mount(view).await,
            After::DelayedLogin => {
                println!("{}", self.render());
                tokio::time::sleep(Duration::from_millis(1500)).await;
                self.mount(ViewId::Login).await;
            }
        }
        Flow::Continue
    }

    /// Dispatches a command to the active view. Field borrows stay disjoint:
    /// the screen is held mutably while the API client and session are only
    /// read, and session writes happen on dedicated paths.
    async fn handle_in_view(&mut self, line: &str) -> After {
        let api = &self.api;
        let token = self.session.token().map(str::to_string);

        match &mut self.screen {
            Screen::Login(form) => {
                if let Some((field, value)) = parse_set(line) {
                    match field {
                        "email" => form.email = value.to_string(),
                        "motdepasse" => form.mot_de_passe = value.to_string(),
                        _ => {}
                    }
                    return After::Nothing;
                }
                if line == "envoyer" {
                    let payload = match form.validate() {
                        Ok(payload) => payload,
                        Err(err) => {
                            form.state.reject(&err);
                            return After::Nothing;
                        }
                    };
                    if !form.state.begin() {
                        return After::Nothing;
                    }
                    match api.login(&payload).await {
                        Ok(response) => {
                            form.state.finish_ok(response.message.clone());
                            let role = Role::from_wire(&response.user.role);
                            self.session.set(Session {
                                user: response.user,
                                token: response.token,
                            });
                            match role {
                                Some(role) => return After::Mount(default_view(role)),
                                None => {
                                    // Unknown role: the menu stays empty, the
                                    // message says why.
                                    form.state.finish_ok(
                                        "Rôle inconnu, aucune vue disponible.".to_string(),
                                    );
                                }
                            }
                        }
                        Err(err) => form.failed(&err),
                    }
                }
                After::Nothing
            }
            Screen::Register(form) => {
                if let Some((field, value)) = parse_set(line) {
                    match field {
                        "nom" => form.nom = value.to_string(),
                        "prenom" => form.prenom = value.to_string(),
                        "email" => form.email = value.to_string(),
                        "motdepasse" => form.mot_de_passe = value.to_string(),
                        _ => {}
                    }
                    return After::Nothing;
                }
                if let Some(value) = line.strip_prefix("role ") {
                    if let Some(role) = Role::from_wire(value.trim()) {
                        form.role = role;
                    }
                    return After::Nothing;
                }
                if line == "envoyer" {
                    let payload = match form.validate() {
                        Ok(payload) => payload,
                        Err(err) => {
                            form.state.reject(&err);
                            return After::Nothing;
                        }
                    };
                    if !form.state.begin() {
                        return After::Nothing;
                    }
                    form.finish(api.register(&payload).await);
                    if form.switch_pending {
                        form.switch_pending = false;
                        return After::DelayedLogin;
                    }
                }
                After::Nothing
            }
            Screen::ClassList(list) => {
                if line == "rafraichir" {
                    if let Some(token) = token {
                        let result = if list.is_owner_view() {
                            api.professor_classes(&token).await
                        } else {
                            api.my_classes(&token).await
                        };
                        list.loaded(result);
                    }
                }
                After::Nothing
            }
            Screen::CreateClass(form) => {
                if let Some((field, value)) = parse_set(line) {
                    match field {
                        "nom" => form.nom = value.to_string(),
                        "description" => form.description = value.to_string(),
                        _ => {}
                    }
                    return After::Nothing;
                }
                if line == "envoyer" {
                    match form.validate() {
                        Ok(payload) => {
                            if let Some(token) = token {
                                if form.state.begin() {
                                    let result = api.create_class(&token, &payload).await;
                                    form.finish(result);
                                }
                            }
                        }
                        Err(err) => form.state.reject(&err),
                    }
                }
                After::Nothing
            }
            Screen::JoinClass(form) => {
                if let Some((field, value)) = parse_set(line) {
                    if field == "code" {
                        form.code = value.to_string();
                    }
                    return After::Nothing;
                }
                if line == "envoyer" {
                    match form.validate() {
                        Ok(payload) => {
                            if let Some(token) = token {
                                if form.state.begin() {
                                    let result = api.join_class(&token, &payload).await;
                                    form.finish(result);
                                }
                            }
                        }
                        Err(err) => form.state.reject(&err),
                    }
                }
                After::Nothing
            }
            Screen::CreateAnnouncement(form) => {
                if let Some(index) = parse_select(line, "classe") {
                    form.picker.select_at(index);
                    return After::Nothing;
                }
                if let Some((field, value)) = parse_set(line) {
                    match field {
                        "titre" => form.titre = value.to_string(),
                        "contenu" => form.contenu = value.to_string(),
                        _ => {}
                    }
                    return After::Nothing;
                }
                if line == "envoyer" {
                    match form.validate() {
                        Ok(payload) => {
                            if let Some(token) = token {
                                if form.state.begin() {
                                    let result = api.create_announcement(&token, &payload).await;
                                    form.finish(result);
                                }
                            }
                        }
                        Err(err) => form.state.reject(&err),
                    }
                }
                After::Nothing
            }
            Screen::Announcements(list) => {
                let fetch = scoped_list_command(list, line);
                if let (Some(fetch), Some(token)) = (fetch, token) {
                    let items = api.announcements(&token, fetch.scope_id).await;
                    list.items_loaded(fetch, items);
                }
                After::Nothing
            }
            Screen::ShareDocumentation(form) => {
                if let Some(index) = parse_select(line, "classe") {
                    form.picker.select_at(index);
                    return After::Nothing;
                }
                if let Some((field, value)) = parse_set(line) {
                    match field {
                        "titre" => form.titre = value.to_string(),
                        "description" => form.description = value.to_string(),
                        "lien" => form.file_path = value.to_string(),
                        _ => {}
                    }
                    return After::Nothing;
                }
                if line == "envoyer" {
                    match form.validate() {
                        Ok(payload) => {
                            if let Some(token) = token {
                                if form.state.begin() {
                                    let result = api.create_documentation(&token, &payload).await;
                                    form.finish(result);
                                }
                            }
                        }
                        Err(err) => form.state.reject(&err),
                    }
                }
                After::Nothing
            }
            Screen::Documentations(list) => {
                let fetch = scoped_list_command(list, line);
                if let (Some(fetch), Some(token)) = (fetch, token) {
                    let items = api.documentations(&token, fetch.scope_id).await;
                    list.items_loaded(fetch, items);
                }
                After::Nothing
            }
            Screen::AssignTask(form) => {
                if let Some(index) = parse_select(line, "classe") {
                    form.picker.select_at(index);
                    return After::Nothing;
                }
                if let Some((field, value)) = parse_set(line) {
                    match field {
                        "titre" => form.titre = value.to_string(),
                        "description" => form.description = value.to_string(),
                        "datelimite" => form.date_limite = value.to_string(),
                        _ => {}
                    }
                    return After::Nothing;
                }
                if line == "envoyer" {
                    match form.validate() {
                        Ok(payload) => {
                            if let Some(token) = token {
                                if form.state.begin() {
                                    let result = api.create_task(&token, &payload).await;
                                    form.finish(result);
                                }
                            }
                        }
                        Err(err) => form.state.reject(&err),
                    }
                }
                After::Nothing
            }
            Screen::Tasks(board) => {
                if let Some(index) = parse_select(line, "soumettre") {
                    board.open_submit_at(index);
                    return After::Nothing;
                }
                if line == "annuler" {
                    board.close_submit();
                    return After::Nothing;
                }
                if let Some((field, value)) = parse_set(line) {
                    if let Some(form) = board.submit_form_mut() {
                        match field {
                            "lien" => form.file_path = value.to_string(),
                            "contenu" => form.content = value.to_string(),
                            _ => {}
                        }
                    }
                    return After::Nothing;
                }
                if line == "envoyer" {
                    if let (Some(form), Some(token)) = (board.submit_form_mut(), token) {
                        match form.validate() {
                            Ok(payload) => {
                                if form.state.begin() {
                                    let result =
                                        api.submit_task(&token, form.task_id, &payload).await;
                                    form.finish(result);
                                }
                            }
                            Err(err) => form.state.reject(&err),
                        }
                    }
                    return After::Nothing;
                }
                let fetch = scoped_list_command(&mut board.list, line);
                if let (Some(fetch), Some(token)) = (fetch, token) {
                    let items = api.class_tasks(&token, fetch.scope_id).await;
                    board.list.items_loaded(fetch, items);
                }
                After::Nothing
            }
            Screen::Review(review) => {
                let Some(token) = token else {
                    return After::Nothing;
                };
                if let Some(index) = parse_select(line, "classe") {
                    if let Some(fetch) = review.select_class_at(index) {
                        let tasks = api.class_tasks(&token, fetch.class_id).await;
                        review.tasks_loaded(fetch, tasks);
                    }
                    return After::Nothing;
                }
                if let Some(index) = parse_select(line, "tache") {
                    if let Some(fetch) = review.select_task_at(index) {
                        let submissions = api.task_submissions(&token, fetch.task_id).await;
                        review.submissions_loaded(fetch, submissions);
                    }
                    return After::Nothing;
                }
                if let Some(index) = parse_select(line, "noter") {
                    review.open_editor_at(index);
                    return After::Nothing;
                }
                if line == "annuler" {
                    review.close_editor();
                    return After::Nothing;
                }
                if let Some(value) = line.strip_prefix("note ") {
                    if let Some(editor) = review.editor_mut() {
                        editor.grade_input = value.trim().to_string();
                    }
                    return After::Nothing;
                }
                if let Some(value) = line.strip_prefix("feedback ") {
                    if let Some(editor) = review.editor_mut() {
                        editor.feedback_input = value.trim().to_string();
                    }
                    return After::Nothing;
                }
                if line == "enregistrer" {
                    if let Some((submission_id, payload)) = review.begin_grade() {
                        let result = api.grade_submission(&token, submission_id, &payload).await;
                        review.grade_finished(submission_id, &payload, result);
                    }
                }
                After::Nothing
            }
            Screen::MySubmissions(screen) => {
                if let Some(index) = parse_select(line, "voir") {
                    if let (Some(submission), Some(token)) =
                        (screen.list.submissions().get(index), token)
                    {
                        let id = submission.id;
                        let mut detail = SubmissionDetail::new();
                        detail.loaded(api.submission(&token, id).await);
                        screen.detail = Some(detail);
                    }
                    return After::Nothing;
                }
                if line == "retour" {
                    screen.detail = None;
                    return After::Nothing;
                }
                if line == "rafraichir" {
                    if let Some(token) = token {
                        screen.list.loaded(api.my_submissions(&token).await);
                        screen.detail = None;
                    }
                }
                After::Nothing
            }
            Screen::SendMessage(composer) => {
                if let Some(value) = line.strip_prefix("type ") {
                    match value.trim() {
                        "prive" => composer.kind = MessageKind::Private,
                        "public" => composer.kind = MessageKind::Public,
                        _ => {}
                    }
                    return After::Nothing;
                }
                if let Some(index) = parse_select(line, "destinataire") {
                    composer.select_recipient_at(index);
                    return After::Nothing;
                }
                if let Some(index) = parse_select(line, "classe") {
                    composer.select_class_at(index);
                    return After::Nothing;
                }
                if let Some((field, value)) = parse_set(line) {
                    if field == "contenu" {
                        composer.content = value.to_string();
                    }
                    return After::Nothing;
                }
                if line == "envoyer" {
                    match composer.validate() {
                        Ok(payload) => {
                            if let Some(token) = token {
                                if composer.state.begin() {
                                    let result = api.send_message(&token, &payload).await;
                                    composer.finish(result);
                                }
                            }
                        }
                        Err(err) => composer.state.reject(&err),
                    }
                }
                After::Nothing
            }
            Screen::PublicMessages(list) => {
                let fetch = scoped_list_command(list, line);
                if let (Some(fetch), Some(token)) = (fetch, token) {
                    let items = api.public_messages(&token, fetch.scope_id).await;
                    list.items_loaded(fetch, items);
                }
                After::Nothing
            }
            Screen::PrivateMessages(list) => {
                if line == "rafraichir" {
                    if let Some(token) = token {
                        list.loaded(api.private_messages(&token).await);
                    }
                }
                After::Nothing
            }
            Screen::CreateProject(form) => {
                if let Some(index) = parse_select(line, "classe") {
                    form.picker.select_at(index);
                    return After::Nothing;
                }
                if let Some((field, value)) = parse_set(line) {
                    match field {
                        "titre" => form.titre = value.to_string(),
                        "description" => form.description = value.to_string(),
                        "datedebut" => form.date_debut = value.to_string(),
                        "datefin" => form.date_fin = value.to_string(),
                        _ => {}
                    }
                    return After::Nothing;
                }
                if line == "envoyer" {
                    match form.validate() {
                        Ok(payload) => {
                            if let Some(token) = token {
                                if form.state.begin() {
                                    let result = api.create_project(&token, &payload).await;
                                    form.finish(result);
                                }
                            }
                        }
                        Err(err) => form.state.reject(&err),
                    }
                }
                After::Nothing
            }
            Screen::Projects(board) => {
                let Some(token) = token else {
                    return After::Nothing;
                };
                if let Some(index) = parse_select(line, "classe") {
                    if let Some(fetch) = board.select_class_at(index) {
                        let tree =
                            fetch_project_tree(api, &token, fetch.class_id, board.can_manage())
                                .await;
                        board.tree_loaded(fetch, tree);
                    }
                    return After::Nothing;
                }
                if let Some(index) = parse_select(line, "nouveaugroupe") {
                    board.open_group_form_at(index);
                    return After::Nothing;
                }
                if line == "annuler" {
                    board.close_group_form();
                    board.cancel_removal();
                    return After::Nothing;
                }
                if let Some((field, value)) = parse_set(line) {
                    if let Some(form) = board.group_form_mut() {
                        match field {
                            "nom" => form.nom = value.to_string(),
                            "description" => form.description = value.to_string(),
                            _ => {}
                        }
                    }
                    return After::Nothing;
                }
                if line == "envoyer" {
                    if let Some(form) = board.group_form_mut() {
                        match form.validate() {
                            Ok(payload) => {
                                if form.state.begin() {
                                    let result = api.create_group(&token, &payload).await;
                                    let refetch = board.mutation_finished(
                                        result,
                                        "Erreur lors de la création du groupe.",
                                    );
                                    if let Some(fetch) = refetch {
                                        let tree = fetch_project_tree(
                                            api,
                                            &token,
                                            fetch.class_id,
                                            board.can_manage(),
                                        )
                                        .await;
                                        board.tree_loaded(fetch, tree);
                                    }
                                }
                            }
                            Err(err) => form.state.reject(&err),
                        }
                    }
                    return After::Nothing;
                }
                if let Some(args) = parse_triple(line, "ajouter") {
                    let (project_index, group_index, candidate_index) = args;
                    let target = board
                        .group_by_path(project_index, group_index)
                        .map(|g| g.id)
                        .and_then(|group_id| {
                            board
                                .candidates_for(group_id)
                                .get(candidate_index)
                                .map(|u| (group_id, u.id))
                        });
                    if let Some((group_id, user_id)) = target {
                        let payload = AddMemberPayload {
                            user_id_to_add: user_id,
                        };
                        let result = api.add_group_member(&token, group_id, &payload).await;
                        let refetch = board.mutation_finished(
                            result,
                            "Erreur lors de l'ajout du membre au groupe.",
                        );
                        if let Some(fetch) = refetch {
                            let tree =
                                fetch_project_tree(api, &token, fetch.class_id, board.can_manage())
                                    .await;
                            board.tree_loaded(fetch, tree);
                        }
                    }
                    return After::Nothing;
                }
                if let Some(args) = parse_triple(line, "retirer") {
                    let (project_index, group_index, member_index) = args;
                    let target = board.group_by_path(project_index, group_index).and_then(|g| {
                        g.members.get(member_index).map(|m| (g.id, m.id))
                    });
                    if let Some((group_id, user_id)) = target {
                        board.request_removal(group_id, user_id);
                    }
                    return After::Nothing;
                }
                if line == "non" {
                    board.cancel_removal();
                    return After::Nothing;
                }
                if line == "oui" {
                    if let Some((group_id, user_id)) = board.confirm_removal() {
                        let result = api.remove_group_member(&token, group_id, user_id).await;
                        let refetch = board.mutation_finished(
                            result,
                            "Erreur lors de la suppression du membre du groupe.",
                        );
                        if let Some(fetch) = refetch {
                            let tree =
                                fetch_project_tree(api, &token, fetch.class_id, board.can_manage())
                                    .await;
                            board.tree_loaded(fetch, tree);
                        }
                    }
                }
                After::Nothing
            }
            Screen::Users(admin) => {
                let Some(token) = token else {
                    return After::Nothing;
                };
                if let Some(index) = parse_select(line, "modifier") {
                    admin.begin_edit_at(index);
                    return After::Nothing;
                }
                if let Some(value) = line.strip_prefix("role ") {
                    if let Some(role) = Role::from_wire(value.trim()) {
                        admin.choose_role(role);
                    }
                    return After::Nothing;
                }
                if line == "annuler" {
                    admin.cancel_edit();
                    admin.cancel_delete();
                    return After::Nothing;
                }
                if line == "enregistrer" {
                    if let Some((user_id, payload)) = admin.begin_role_change() {
                        let result = api.change_role(&token, user_id, &payload).await;
                        if admin.role_change_finished(result) {
                            admin.users_loaded(api.all_users(&token).await);
                        }
                    }
                    return After::Nothing;
                }
                if let Some(index) = parse_select(line, "supprimer") {
                    admin.request_delete_at(index);
                    return After::Nothing;
                }
                if line == "non" {
                    admin.cancel_delete();
                    return After::Nothing;
                }
                if line == "oui" {
                    if let Some(user_id) = admin.confirm_delete() {
                        let result = api.delete_user(&token, user_id).await;
                        if admin.delete_finished(result) {
                            admin.users_loaded(api.all_users(&token).await);
                        }
                    }
                    return After::Nothing;
                }
                if line == "rafraichir" {
                    admin.users_loaded(api.all_users(&token).await);
                }
                After::Nothing
            }
        }
    }

    // -- rendering ----------------------------------------------------------

    fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "────────────────────────────────────────");
        match self.session.current() {
            Some(session) => {
                let _ = writeln!(
                    out,
                    "Classroom — {} | Bienvenue, {} ({})",
                    self.active_label,
                    session.user.prenom,
                    session.user.role
                );
                for (i, entry) in self.menu().iter().enumerate() {
                    let _ = writeln!(out, "  {} {} {}", i + 1, entry.icon, entry.label);
                }
                let _ = writeln!(out, "[ouvrir N · deconnexion · q]");
            }
            None => {
                let _ = writeln!(out, "Classroom — Bienvenue");
                let _ = writeln!(out, "Veuillez vous connecter ou vous inscrire.");
                let _ = writeln!(out, "[connexion · inscription · q]");
            }
        }
        let _ = writeln!(out, "── {} ──", self.active_label);
        self.render_screen(&mut out);
        out
    }

    fn render_screen(&self, out: &mut String) {
        match &self.screen {
            Screen::Login(form) => {
                let _ = writeln!(out, "email: {}", form.email);
                let _ = writeln!(out, "motdepasse: {}", mask(&form.mot_de_passe));
                render_form_state(out, &form.state);
                let _ = writeln!(out, "[set email … · set motdepasse … · envoyer]");
            }
            Screen::Register(form) => {
                let _ = writeln!(out, "nom: {}", form.nom);
                let _ = writeln!(out, "prenom: {}", form.prenom);
                let _ = writeln!(out, "email: {}", form.email);
                let _ = writeln!(out, "motdepasse: {}", mask(&form.mot_de_passe));
                let _ = writeln!(out, "role: {}", form.role);
                render_form_state(out, &form.state);
                let _ = writeln!(
                    out,
                    "[set <champ> … · role <Etudiant|Professeur|Coordinateur> · envoyer]"
                );
            }
            Screen::ClassList(list) => {
                render_message(out, list.message(), list.is_loading());
                for class in list.classes() {
                    let _ = writeln!(out, "• {}", class.nom);
                    if let Some(description) = &class.description {
                        let _ = writeln!(out, "  {description}");
                    }
                    if list.is_owner_view() {
                        if let Some(code) = &class.code {
                            let _ = writeln!(out, "  Code : {code}");
                        }
                    } else if let (Some(nom), Some(prenom)) =
                        (&class.professeur_nom, &class.professeur_prenom)
                    {
                        let _ = writeln!(out, "  Professeur : {prenom} {nom}");
                    }
                }
                let _ = writeln!(out, "[rafraichir]");
            }
            Screen::CreateClass(form) => {
                let _ = writeln!(out, "nom: {}", form.nom);
                let _ = writeln!(out, "description: {}", form.description);
                render_form_state(out, &form.state);
                let _ = writeln!(out, "[set nom … · set description … · envoyer]");
            }
            Screen::JoinClass(form) => {
                let _ = writeln!(out, "code: {}", form.code);
                render_form_state(out, &form.state);
                let _ = writeln!(out, "[set code … · envoyer]");
            }
            Screen::CreateAnnouncement(form) => {
                render_picker(out, form.picker.classes(), form.picker.selected());
                render_form_message(out, form.picker.message());
                let _ = writeln!(out, "titre: {}", form.titre);
                let _ = writeln!(out, "contenu: {}", form.contenu);
                render_form_state(out, &form.state);
                let _ = writeln!(out, "[classe N · set titre … · set contenu … · envoyer]");
            }
            Screen::Announcements(list) => {
                render_scopes(out, list.scopes(), list.selected_scope());
                render_message(out, list.message(), list.is_loading());
                for announcement in list.items() {
                    let _ = writeln!(out, "• {}", announcement.titre);
                    let _ = writeln!(out, "  {}", announcement.contenu);
                    let _ = writeln!(
                        out,
                        "  Publié par {} le {}",
                        author(&announcement.professeur_prenom, &announcement.professeur_nom),
                        format_date(&announcement.created_at)
                    );
                }
                let _ = writeln!(out, "[classe N · rafraichir]");
            }
            Screen::ShareDocumentation(form) => {
                render_picker(out, form.picker.classes(), form.picker.selected());
                render_form_message(out, form.picker.message());
                let _ = writeln!(out, "titre: {}", form.titre);
                let _ = writeln!(out, "description: {}", form.description);
                let _ = writeln!(out, "lien: {}", form.file_path);
                render_form_state(out, &form.state);
                let _ = writeln!(out, "[classe N · set titre/description/lien … · envoyer]");
            }
            Screen::Documentations(list) => {
                render_scopes(out, list.scopes(), list.selected_scope());
                render_message(out, list.message(), list.is_loading());
                for doc in list.items() {
                    let _ = writeln!(out, "• {}", doc.titre);
                    if let Some(description) = &doc.description {
                        let _ = writeln!(out, "  {description}");
                    }
                    if let Some(path) = &doc.file_path {
                        let _ = writeln!(out, "  Lien : {path}");
                    }
                    let _ = writeln!(
                        out,
                        "  Partagé par {} le {}",
                        author(&doc.professeur_prenom, &doc.professeur_nom),
                        format_date(&doc.created_at)
                    );
                }
                let _ = writeln!(out, "[classe N · rafraichir]");
            }
            Screen::AssignTask(form) => {
                render_picker(out, form.picker.classes(), form.picker.selected());
                render_form_message(out, form.picker.message());
                let _ = writeln!(out, "titre: {}", form.titre);
                let _ = writeln!(out, "description: {}", form.description);
                let _ = writeln!(out, "datelimite: {}", form.date_limite);
                render_form_state(out, &form.state);
                let _ = writeln!(
                    out,
                    "[classe N · set titre/description/datelimite … · envoyer]"
                );
            }
            Screen::Tasks(board) => {
                render_scopes(out, board.list.scopes(), board.list.selected_scope());
                render_message(out, board.list.message(), board.list.is_loading());
                for (i, task) in board.list.items().iter().enumerate() {
                    let _ = writeln!(out, "{} • {}", i + 1, task.titre);
                    if let Some(description) = &task.description {
                        let _ = writeln!(out, "  {description}");
                    }
                    if let Some(date) = &task.date_limite {
                        let _ = writeln!(out, "  À rendre le : {}", format_date(date));
                    }
                }
                if let Some(form) = board.submit_form() {
                    let _ = writeln!(out, "── Soumettre la tâche #{} ──", form.task_id);
                    let _ = writeln!(out, "lien: {}", form.file_path);
                    let _ = writeln!(out, "contenu: {}", form.content);
                    render_form_state(out, &form.state);
                    let _ = writeln!(out, "[set lien … · set contenu … · envoyer · annuler]");
                } else {
                    let _ = writeln!(out, "[classe N · soumettre N · rafraichir]");
                }
            }
            Screen::Review(review) => {
                render_message(out, review.message(), review.is_loading());
                if !review.is_authorized() {
                    return;
                }
                render_scopes(out, review.classes(), review.selected_class());
                if !review.tasks().is_empty() {
                    let _ = writeln!(out, "Tâches :");
                    for (i, task) in review.tasks().iter().enumerate() {
                        let marker = if review.selected_task() == Some(task.id) {
                            '>'
                        } else {
                            ' '
                        };
                        let _ = writeln!(out, " {marker}{} {}", i + 1, task.titre);
                    }
                }
                for (i, submission) in review.submissions().iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "{} • Soumission de {}",
                        i + 1,
                        author(&submission.student_prenom, &submission.student_nom)
                    );
                    let _ = writeln!(
                        out,
                        "  Soumis le : {}",
                        format_date(&submission.submitted_at)
                    );
                    if let Some(path) = &submission.file_path {
                        let _ = writeln!(out, "  Fichier : {path}");
                    }
                    if let Some(content) = &submission.content {
                        let _ = writeln!(out, "  Contenu : {content}");
                    }
                    if let Some(grade) = submission.grade {
                        let _ = writeln!(out, "  Note : {grade} / 100");
                    }
                    if let Some(feedback) = &submission.correction_feedback {
                        let _ = writeln!(out, "  Feedback : {feedback}");
                    }
                }
                if let Some(editor) = review.editor() {
                    let _ = writeln!(out, "── Noter la soumission #{} ──", editor.submission_id);
                    let _ = writeln!(out, "note (0-100): {}", editor.grade_input);
                    let _ = writeln!(out, "feedback: {}", editor.feedback_input);
                    render_form_message(out, editor.message.as_deref());
                    let _ = writeln!(out, "[note … · feedback … · enregistrer · annuler]");
                } else {
                    let _ = writeln!(out, "[classe N · tache N · noter N]");
                }
            }
            Screen::MySubmissions(screen) => {
                if let Some(detail) = &screen.detail {
                    render_form_message(out, detail.message());
                    if let Some(submission) = detail.submission() {
                        if let Some(titre) = &submission.task_titre {
                            let _ = writeln!(out, "Tâche : {titre}");
                        }
                        if let Some(class_name) = &submission.class_name {
                            let _ = writeln!(out, "Classe : {class_name}");
                        }
                        let _ = writeln!(
                            out,
                            "Soumis le : {}",
                            format_date(&submission.submitted_at)
                        );
                        if let Some(grade) = submission.grade {
                            let _ = writeln!(out, "Note : {grade} / 100");
                        }
                        if let Some(feedback) = &submission.correction_feedback {
                            let _ = writeln!(out, "Feedback : {feedback}");
                        }
                        if detail.pending_correction() {
                            let _ = writeln!(out, "En attente de correction");
                        }
                    }
                    let _ = writeln!(out, "[retour]");
                    return;
                }
                render_message(out, screen.list.message(), screen.list.is_loading());
                for (i, submission) in screen.list.submissions().iter().enumerate() {
                    let titre = submission.task_titre.as_deref().unwrap_or("(sans titre)");
                    let _ = writeln!(out, "{} • {titre}", i + 1);
                    match submission.grade {
                        Some(grade) => {
                            let _ = writeln!(out, "  Note : {grade} / 100");
                        }
                        None => {
                            let _ = writeln!(out, "  En attente de correction");
                        }
                    }
                }
                let _ = writeln!(out, "[voir N · rafraichir]");
            }
            Screen::SendMessage(composer) => {
                let kind = match composer.kind {
                    MessageKind::Private => "prive",
                    MessageKind::Public => "public",
                };
                let _ = writeln!(out, "type: {kind}");
                match composer.kind {
                    MessageKind::Private => {
                        let _ = writeln!(out, "Destinataires :");
                        for (i, user) in composer.recipients().iter().enumerate() {
                            let marker = if composer.selected_recipient() == Some(user.id) {
                                '>'
                            } else {
                                ' '
                            };
                            let _ = writeln!(
                                out,
                                " {marker}{} {} ({})",
                                i + 1,
                                user.full_name(),
                                user.role
                            );
                        }
                    }
                    MessageKind::Public => {
                        render_scopes(out, composer.classes(), composer.selected_class());
                    }
                }
                let _ = writeln!(out, "contenu: {}", composer.content);
                render_form_state(out, &composer.state);
                let _ = writeln!(
                    out,
                    "[type prive|public · destinataire N · classe N · set contenu … · envoyer]"
                );
            }
            Screen::PublicMessages(list) => {
                render_scopes(out, list.scopes(), list.selected_scope());
                render_message(out, list.message(), list.is_loading());
                for message in list.items() {
                    let _ = writeln!(
                        out,
                        "• De : {} ({})",
                        author(&message.sender_prenom, &message.sender_nom),
                        message.sender_role.as_deref().unwrap_or("?")
                    );
                    let _ = writeln!(out, "  {}", message.content);
                    let _ = writeln!(out, "  Envoyé le : {}", format_date(&message.created_at));
                }
                let _ = writeln!(out, "[classe N · rafraichir]");
            }
            Screen::PrivateMessages(list) => {
                render_message(out, list.message(), list.is_loading());
                for message in list.messages() {
                    match list.direction(message) {
                        Direction::Sent => {
                            let _ = writeln!(
                                out,
                                "→ À : {} ({})",
                                author(&message.receiver_prenom, &message.receiver_nom),
                                message.receiver_role.as_deref().unwrap_or("?")
                            );
                        }
                        Direction::Received => {
                            let _ = writeln!(
                                out,
                                "← De : {} ({})",
                                author(&message.sender_prenom, &message.sender_nom),
                                message.sender_role.as_deref().unwrap_or("?")
                            );
                        }
                    }
                    let _ = writeln!(out, "  {}", message.content);
                    let _ = writeln!(out, "  {}", format_date(&message.created_at));
                }
                let _ = writeln!(out, "[rafraichir]");
            }
            Screen::CreateProject(form) => {
                render_picker(out, form.picker.classes(), form.picker.selected());
                render_form_message(out, form.picker.message());
                let _ = writeln!(out, "titre: {}", form.titre);
                let _ = writeln!(out, "description: {}", form.description);
                let _ = writeln!(out, "datedebut: {}", form.date_debut);
                let _ = writeln!(out, "datefin: {}", form.date_fin);
                render_form_state(out, &form.state);
                let _ = writeln!(
                    out,
                    "[classe N · set titre/description/datedebut/datefin … · envoyer]"
                );
            }
            Screen::Projects(board) => {
                render_scopes(out, board.classes(), board.selected_class());
                render_message(out, board.message(), board.is_loading());
                for (pi, entry) in board.projects().iter().enumerate() {
                    render_project(out, pi, entry, board);
                }
                if let Some(form) = board.group_form() {
                    let _ = writeln!(out, "── Nouveau groupe (projet #{}) ──", form.project_id);
                    let _ = writeln!(out, "nom: {}", form.nom);
                    let _ = writeln!(out, "description: {}", form.description);
                    render_form_state(out, &form.state);
                    let _ = writeln!(out, "[set nom … · set description … · envoyer · annuler]");
                } else if board.pending_removal().is_some() {
                    let _ = writeln!(
                        out,
                        "Êtes-vous sûr de vouloir supprimer ce membre du groupe ? [oui · non]"
                    );
                } else if board.can_manage() {
                    let _ = writeln!(
                        out,
                        "[classe N · nouveaugroupe P · ajouter P G N · retirer P G N]"
                    );
                } else {
                    let _ = writeln!(out, "[classe N · rafraichir]");
                }
            }
            Screen::Users(admin) => {
                render_message(out, admin.message(), admin.is_loading());
                for (i, user) in admin.users().iter().enumerate() {
                    let editing = admin
                        .edit()
                        .map(|e| e.user_id == user.id)
                        .unwrap_or(false);
                    let _ = writeln!(
                        out,
                        "{} • {} — {} {}",
                        i + 1,
                        user.full_name(),
                        user.role,
                        if editing { "(modification)" } else { "" }
                    );
                    if let Some(email) = &user.email {
                        let _ = writeln!(out, "  {email}");
                    }
                }
                if let Some(edit) = admin.edit() {
                    let _ = writeln!(out, "Nouveau rôle : {}", edit.selected);
                    let _ = writeln!(
                        out,
                        "[role <Etudiant|Professeur|Coordinateur> · enregistrer · annuler]"
                    );
                } else if admin.pending_delete().is_some() {
                    let _ = writeln!(
                        out,
                        "Êtes-vous sûr de vouloir supprimer cet utilisateur ? Cette action est irréversible. [oui · non]"
                    );
                } else if admin.is_authorized() {
                    let _ = writeln!(out, "[modifier N · supprimer N · rafraichir]");
                }
            }
        }
    }
}

fn render_project(out: &mut String, pi: usize, entry: &ProjectEntry, board: &ProjectBoard) {
    let _ = writeln!(out, "{} ▪ {}", pi + 1, entry.project.titre);
    if let Some(description) = &entry.project.description {
        let _ = writeln!(out, "  {description}");
    }
    if let (Some(debut), Some(fin)) = (&entry.project.date_debut, &entry.project.date_fin) {
        let _ = writeln!(out, "  Du {} au {}", format_date(debut), format_date(fin));
    }
    if let Some(statut) = &entry.project.statut {
        let _ = writeln!(out, "  Statut : {statut}");
    }
    for (gi, group) in entry.groups.iter().enumerate() {
        let _ = writeln!(out, "  {}.{} Groupe : {}", pi + 1, gi + 1, group.nom);
        if group.members.is_empty() {
            let _ = writeln!(out, "      (aucun membre)");
        }
        for (mi, member) in group.members.iter().enumerate() {
            let _ = writeln!(out, "      {} {} {}", mi + 1, member.prenom, member.nom);
        }
        if board.can_manage() {
            let candidates = board.candidates_for(group.id);
            if !candidates.is_empty() {
                let names: Vec<String> = candidates
                    .iter()
                    .enumerate()
                    .map(|(i, u)| format!("{} {}", i + 1, u.full_name()))
                    .collect();
                let _ = writeln!(out, "      Ajouter : {}", names.join(" · "));
            }
        }
    }
}

/// Resolves the `classe N` / `rafraichir` commands shared by every scoped
/// list view; the caller performs the returned fetch.
fn scoped_list_command<T>(list: &mut ScopedList<T>, line: &str) -> Option<ItemFetch> {
    if let Some(index) = parse_select(line, "classe") {
        return list.select_scope_at(index);
    }
    if line == "rafraichir" {
        return list.refresh();
    }
    None
}

async fn fetch_project_tree(
    api: &ApiClient,
    token: &str,
    class_id: i64,
    with_roster: bool,
) -> Result<ProjectTree, ApiError> {
    let projects = api.class_projects(token, class_id).await?;
    let mut entries = Vec::with_capacity(projects.len());
    for project in projects {
        let groups = api.project_groups(token, project.id).await?;
        entries.push(ProjectEntry { project, groups });
    }
    let roster = if with_roster {
        api.class_students(token, class_id).await?
    } else {
        Vec::new()
    };
    Ok(ProjectTree {
        projects: entries,
        roster,
    })
}

// -- small rendering/parsing helpers ----------------------------------------

fn render_scopes(out: &mut String, scopes: &[crate::api::types::ClassRoom], selected: Option<i64>) {
    if scopes.is_empty() {
        return;
    }
    let _ = writeln!(out, "Classes :");
    for (i, class) in scopes.iter().enumerate() {
        let marker = if selected == Some(class.id) { '>' } else { ' ' };
        let _ = writeln!(out, " {marker}{} {}", i + 1, class.nom);
    }
}

fn render_picker(out: &mut String, classes: &[crate::api::types::ClassRoom], selected: Option<i64>) {
    render_scopes(out, classes, selected);
}

fn render_message(out: &mut String, message: Option<&str>, loading: bool) {
    if loading {
        let _ = writeln!(out, "Chargement…");
    }
    if let Some(message) = message {
        let _ = writeln!(out, "ℹ {message}");
    }
}

fn render_form_message(out: &mut String, message: Option<&str>) {
    if let Some(message) = message {
        let _ = writeln!(out, "ℹ {message}");
    }
}

/// Form status line: the submitting flag is the terminal counterpart of the
/// disabled submit button.
fn render_form_state(out: &mut String, state: &FormState) {
    if state.is_submitting() {
        let _ = writeln!(out, "Envoi en cours…");
    }
    render_form_message(out, state.message());
}

fn author(prenom: &Option<String>, nom: &Option<String>) -> String {
    match (prenom, nom) {
        (Some(prenom), Some(nom)) => format!("{prenom} {nom}"),
        (Some(prenom), None) => prenom.clone(),
        (None, Some(nom)) => nom.clone(),
        (None, None) => "?".to_string(),
    }
}

fn mask(value: &str) -> String {
    "•".repeat(value.chars().count())
}

/// Backend timestamps are RFC 3339; anything else is shown as-is.
fn format_date(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(date) => date.format("%d/%m/%Y %H:%M").to_string(),
        Err(_) => value.to_string(),
    }
}

/// Parses a 1-based index argument into a 0-based one.
fn parse_index(arg: &str) -> Option<usize> {
    arg.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1))
}

/// `"<verb> N"` → 0-based index.
fn parse_select(line: &str, verb: &str) -> Option<usize> {
    line.strip_prefix(verb)
        .and_then(|rest| rest.strip_prefix(' '))
        .and_then(parse_index)
}

/// `"<verb> P G N"` → three 0-based indices.
fn parse_triple(line: &str, verb: &str) -> Option<(usize, usize, usize)> {
    let rest = line.strip_prefix(verb)?.trim();
    let mut parts = rest.split_whitespace();
    let a = parse_index(parts.next()?)?;
    let b = parse_index(parts.next()?)?;
    let c = parse_index(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((a, b, c))
}

/// `"set <champ> <valeur…>"` → (champ, valeur).
fn parse_set(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("set ")?;
    let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
    Some((field, value.trim()))
}

/// Reads one line from stdin without blocking the runtime. `None` on EOF.
async fn read_line() -> anyhow::Result<Option<String>> {
    let line = tokio::task::spawn_blocking(|| {
        let mut buf = String::new();
        match std::io::stdin().read_line(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf)),
            Err(e) => Err(e),
        }
    })
    .await??;
    Ok(line)
}
