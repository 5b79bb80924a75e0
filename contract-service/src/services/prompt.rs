//! Prompt templates for the 30-day contract.

use crate::models::IntakeForm;

/// Fixed instruction sent as the system message of every request.
pub const SYSTEM_PROMPT: &str = "Você é um agente de desenvolvimento pessoal para brasileiros.
Aplique discretamente: 2–3 ações de maior impacto, blocos diários curtos (5–25 min),
check-ins semanais e retomada no mesmo dia se falhar.
Gere um \"Contrato de 30 dias\" claro, prático e encorajador (~180–220 palavras, pt-BR).
Estrutura:
- Compromisso (objetivo)
- Por que agora
- 2–3 ações de maior impacto
- Rotina diária (blocos curtos, consistência)
- Check-ins semanais (quando/como)
- Retomada (o que fazer ao falhar no dia)
Não cite nomes de métodos; seja simples, humano e direto.";

/// System and user messages for one chat-completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    pub fn from_intake(form: &IntakeForm) -> Self {
        let user = format!(
            "Objetivo (30 dias): {}
Por que agora: {}
Tempo diário disponível: {}
Recursos disponíveis: {}
Obstáculo provável: {}
Crie o contrato seguindo o formato pedido, em até ~220 palavras.",
            form.objective_or_placeholder(),
            form.motivation_or_placeholder(),
            form.daily_time_or_placeholder(),
            form.resources_or_placeholder(),
            form.obstacle_or_placeholder(),
        );

        Self {
            system: SYSTEM_PROMPT.to_string(),
            user,
        }
    }
}
