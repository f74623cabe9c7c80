//! User-visible text. The interface speaks Arabic.

pub const APP_NAME: &str = "Genisi";

/// Shown when the service answered but returned no text segments.
pub const CONNECTION_ERROR: &str = "عذراً، حدث خطأ في الاتصال.";

/// Shown for every delivery failure.
pub const SERVICE_UNREACHABLE: &str =
    "عذراً، لم أستطع الاتصال بالخدمة. يرجى التأكد من إعداد API بشكل صحيح.";

pub const SUGGESTIONS: [&str; 4] = [
    "اكتب لي قصة قصيرة",
    "ساعدني في تعلم البرمجة",
    "اشرح لي الذكاء الاصطناعي",
    "اقترح أفكار إبداعية",
];

pub const WELCOME_TITLE: &str = "مرحباً، أنا Genisi";
pub const WELCOME_SUBTITLE: &str = "كيف يمكنني مساعدتك اليوم؟";

pub const USER_LABEL: &str = "أنت";
pub const ASSISTANT_LABEL: &str = APP_NAME;

pub const COMPOSER_PLACEHOLDER: &str = "اكتب رسالة إلى Genisi...";
pub const DISCLAIMER: &str = "Genisi يمكن أن يرتكب أخطاء. يرجى التحقق من المعلومات المهمة.";

pub const NEW_CHAT: &str = "محادثة جديدة";
pub const PREVIOUS_CHATS: &str = "المحادثات السابقة";
pub const PREVIOUS_CHAT_PREFIX: &str = "محادثة سابقة";
pub const SIDEBAR_FOOTER: &str = "Genisi AI Assistant";
