//! Erasmus event enumerations.

define_text_enum! {
    /// Calendar event kind shown on the public agenda.
    EventType ("event type") {
        Apertura = ("apertura", "Apertura de convocatoria"),
        Cierre = ("cierre", "Cierre de convocatoria"),
        Entrevista = ("entrevista", "Entrevistas"),
        PublicacionProvisional = ("publicacion_provisional", "Publicación provisional"),
        PublicacionDefinitivo = ("publicacion_definitivo", "Publicación definitiva"),
        ReunionInformativa = ("reunion_informativa", "Reunión informativa"),
        Otro = ("otro", "Otro"),
    }
}
