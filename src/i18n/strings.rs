//! Built-in string tables.
//!
//! Each table is a flat list of `(key, value)` pairs using dot-notation keys.
//! Placeholders use `{name}` and must match across languages (checked by
//! [`crate::i18n::CatalogValidator`]).

/// English strings (canonical)
pub const ENGLISH_STRINGS: &[(&str, &str)] = &[
    // Navigation
    ("nav.home", "Home"),
    ("nav.courses", "Courses"),
    ("nav.profile", "My Profile"),
    ("nav.login", "Log in"),
    ("nav.signup", "Sign up"),
    ("nav.logout", "Log out"),
    // Authentication
    ("auth.email", "Email"),
    ("auth.password", "Password"),
    ("auth.display_name", "Full name"),
    ("auth.welcome_back", "Welcome back, {name}!"),
    // Course display
    ("course.instructor", "Instructor"),
    ("course.duration", "Duration"),
    ("course.lessons", "{count} lessons"),
    ("course.students", "{count} students"),
    ("course.self_paced", "Self-paced"),
    ("course.free", "Free"),
    ("course.enroll", "Enroll now"),
    ("course.not_found", "Course not found"),
    // Gamification
    ("gamification.level", "Level {level}"),
    ("gamification.points", "{points} points"),
    ("gamification.badges", "Badges"),
    ("gamification.level_up_title", "Level up!"),
    ("gamification.level_up_message", "You reached level {level}!"),
    ("gamification.new_badge_title", "New badge!"),
    ("gamification.new_badge_message", "You earned the {badge} badge!"),
    // Consent banner
    ("consent.message", "We use local storage to remember your progress."),
    ("consent.accept", "Accept"),
    ("consent.decline", "Decline"),
];

/// Spanish strings
pub const SPANISH_STRINGS: &[(&str, &str)] = &[
    ("nav.home", "Inicio"),
    ("nav.courses", "Cursos"),
    ("nav.profile", "Mi perfil"),
    ("nav.login", "Iniciar sesión"),
    ("nav.signup", "Registrarse"),
    ("nav.logout", "Cerrar sesión"),
    ("auth.email", "Correo electrónico"),
    ("auth.password", "Contraseña"),
    ("auth.display_name", "Nombre completo"),
    ("auth.welcome_back", "¡Bienvenido de nuevo, {name}!"),
    ("course.instructor", "Instructor"),
    ("course.duration", "Duración"),
    ("course.lessons", "{count} lecciones"),
    ("course.students", "{count} estudiantes"),
    ("course.self_paced", "A tu ritmo"),
    ("course.free", "Gratis"),
    ("course.enroll", "Inscríbete ahora"),
    ("course.not_found", "Curso no encontrado"),
    ("gamification.level", "Nivel {level}"),
    ("gamification.points", "{points} puntos"),
    ("gamification.badges", "Insignias"),
    ("gamification.level_up_title", "¡Subiste de nivel!"),
    ("gamification.level_up_message", "¡Alcanzaste el nivel {level}!"),
    ("gamification.new_badge_title", "¡Nueva insignia!"),
    ("gamification.new_badge_message", "¡Ganaste la insignia {badge}!"),
    ("consent.message", "Usamos el almacenamiento local para recordar tu progreso."),
    ("consent.accept", "Aceptar"),
    ("consent.decline", "Rechazar"),
];

/// French strings
pub const FRENCH_STRINGS: &[(&str, &str)] = &[
    ("nav.home", "Accueil"),
    ("nav.courses", "Cours"),
    ("nav.profile", "Mon profil"),
    ("nav.login", "Connexion"),
    ("nav.signup", "Inscription"),
    ("nav.logout", "Déconnexion"),
    ("auth.email", "E-mail"),
    ("auth.password", "Mot de passe"),
    ("auth.display_name", "Nom complet"),
    ("auth.welcome_back", "Bon retour, {name} !"),
    ("course.instructor", "Formateur"),
    ("course.duration", "Durée"),
    ("course.lessons", "{count} leçons"),
    ("course.students", "{count} étudiants"),
    ("course.self_paced", "À votre rythme"),
    ("course.free", "Gratuit"),
    ("course.enroll", "S'inscrire"),
    ("course.not_found", "Cours introuvable"),
    ("gamification.level", "Niveau {level}"),
    ("gamification.points", "{points} points"),
    ("gamification.badges", "Badges"),
    ("gamification.level_up_title", "Niveau supérieur !"),
    ("gamification.level_up_message", "Vous avez atteint le niveau {level} !"),
    ("gamification.new_badge_title", "Nouveau badge !"),
    ("gamification.new_badge_message", "Vous avez obtenu le badge {badge} !"),
    ("consent.message", "Nous utilisons le stockage local pour mémoriser votre progression."),
    ("consent.accept", "Accepter"),
    ("consent.decline", "Refuser"),
];
